//! Reference rows inserted on every startup (`INSERT OR IGNORE`)
//!
//! Prices are base-level unit rates in roubles; the normative columns follow
//! the direct cost split labor / materials / machines.

use crate::{uuid_utils, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// (code, name, unit, base_type, price, labor, material, machine, section)
type NormativeSeed = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
    f64,
    f64,
    &'static str,
);

const NORMATIVES: &[NormativeSeed] = &[
    ("ФЕР01-01-003-01", "Разработка грунта экскаватором в отвал", "1000 м³", "FER", 5120.40, 410.20, 0.0, 4710.20, "Земляные работы"),
    ("ФЕР06-01-001-01", "Устройство бетонной подготовки", "100 м³", "FER", 118_430.00, 18_950.00, 92_100.00, 7_380.00, "Бетонные конструкции монолитные"),
    ("ФЕР08-02-001-01", "Кладка стен кирпичных наружных простых", "м³", "FER", 1_630.55, 420.80, 1_150.30, 59.45, "Конструкции из кирпича и блоков"),
    ("ФЕР11-01-011-01", "Устройство стяжек цементных толщиной 20 мм", "100 м²", "FER", 2_980.10, 1_040.70, 1_842.60, 96.80, "Полы"),
    ("ФЕР15-02-016-01", "Штукатурка поверхностей внутри здания улучшенная", "100 м²", "FER", 4_215.90, 2_310.40, 1_801.20, 104.30, "Отделочные работы"),
    ("ФЕР15-04-005-01", "Окраска водоэмульсионными составами по штукатурке", "100 м²", "FER", 1_120.35, 540.15, 570.10, 10.10, "Отделочные работы"),
    ("ГЭСН11-01-036-01", "Устройство покрытий из линолеума", "100 м²", "GESN", 3_410.00, 980.00, 2_390.00, 40.00, "Полы"),
    ("ГЭСН15-01-019-01", "Облицовка стен керамической плиткой", "100 м²", "GESN", 9_870.00, 4_120.00, 5_600.00, 150.00, "Отделочные работы"),
    ("ГЭСН16-04-001-01", "Прокладка трубопроводов водоснабжения", "100 м", "GESN", 6_540.00, 2_050.00, 4_310.00, 180.00, "Трубопроводы внутренние"),
    ("ТЕР12-01-002-09", "Устройство кровель из наплавляемых материалов", "100 м²", "TER", 5_260.70, 980.30, 4_120.40, 160.00, "Кровли"),
    ("ТЕР26-01-041-01", "Изоляция поверхностей минераловатными плитами", "м³", "TER", 1_480.20, 390.60, 1_060.10, 29.50, "Теплоизоляционные работы"),
    ("ТСН-2001.15-1-1", "Грунтование поверхностей стен", "100 м²", "TSN", 640.00, 310.00, 320.00, 10.00, "Отделочные работы"),
    ("ТСН-2001.21-4-2", "Монтаж розеток и выключателей", "10 шт", "TSN", 1_150.00, 880.00, 250.00, 20.00, "Электромонтажные работы"),
];

/// (name, unit, price, category, supplier)
const MATERIALS: &[(&str, &str, f64, &str, &str)] = &[
    ("Штукатурка гипсовая Knauf Ротбанд 30 кг", "мешок", 520.0, "plaster", "Knauf"),
    ("Штукатурка гипсовая Волма Слой 30 кг", "мешок", 390.0, "plaster", "Волма"),
    ("Шпатлевка финишная Vetonit LR+ 20 кг", "мешок", 780.0, "putty", "Weber"),
    ("Грунтовка глубокого проникновения 10 л", "канистра", 610.0, "primer", "Ceresit"),
    ("Краска водоэмульсионная интерьерная 10 л", "ведро", 2_350.0, "paint", "Tikkurila"),
    ("Плитка керамическая настенная", "м²", 1_150.0, "tile", "Kerama Marazzi"),
    ("Клей плиточный Ceresit CM 11 25 кг", "мешок", 540.0, "tile", "Ceresit"),
    ("Ламинат 33 класс", "м²", 1_290.0, "flooring", "Tarkett"),
    ("Линолеум полукоммерческий", "м²", 720.0, "flooring", "Tarkett"),
    ("Цемент М500 50 кг", "мешок", 560.0, "screed", "Евроцемент"),
    ("Пескобетон М300 40 кг", "мешок", 310.0, "screed", "Каменный цветок"),
    ("Кирпич керамический рядовой", "шт", 18.5, "masonry", "Wienerberger"),
    ("Плита минераловатная 50 мм", "м²", 165.0, "insulation", "Rockwool"),
    ("Кабель ВВГнг 3x2.5", "м", 98.0, "electrical", "Севкабель"),
];

/// Insert normative and material reference rows that are not present yet
pub async fn seed_reference_data(pool: &SqlitePool) -> Result<()> {
    for &(code, name, unit, base_type, price, labor, material, machine, section) in NORMATIVES {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO normatives
                (id, code, name, unit, base_type, price, labor_cost, material_cost, machine_cost, section)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid_utils::generate())
        .bind(code)
        .bind(name)
        .bind(unit)
        .bind(base_type)
        .bind(price)
        .bind(labor)
        .bind(material)
        .bind(machine)
        .bind(section)
        .execute(pool)
        .await?;
    }

    for &(name, unit, price, category, supplier) in MATERIALS {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO materials (id, name, unit, price, category, supplier)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid_utils::generate())
        .bind(name)
        .bind(unit)
        .bind(price)
        .bind(category)
        .bind(supplier)
        .execute(pool)
        .await?;
    }

    debug!(
        "Reference data ensured ({} normatives, {} materials)",
        NORMATIVES.len(),
        MATERIALS.len()
    );
    Ok(())
}

/// Number of seeded normative rows
pub fn normative_seed_count() -> usize {
    NORMATIVES.len()
}

/// Number of seeded material rows
pub fn material_seed_count() -> usize {
    MATERIALS.len()
}
