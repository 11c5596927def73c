//! Month and weekday names for every supported language.

use chrono::Weekday;

use crate::language::{Language, WeekStart};

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_ZH: [&str; 12] = [
    "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月",
    "十二月",
];
const MONTHS_DE: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September", "Oktober",
    "November", "Dezember",
];
const MONTHS_ES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio", "Julio", "Agosto", "Septiembre",
    "Octubre", "Noviembre", "Diciembre",
];
const MONTHS_FR: [&str; 12] = [
    "Janvier", "Février", "Mars", "Avril", "Mai", "Juin", "Juillet", "Août", "Septembre",
    "Octobre", "Novembre", "Décembre",
];
const MONTHS_JA: [&str; 12] = [
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];

// Sunday first.
const WEEKDAYS_SHORT_EN: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const WEEKDAYS_SHORT_ZH: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];
const WEEKDAYS_SHORT_DE: [&str; 7] = ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"];
const WEEKDAYS_SHORT_ES: [&str; 7] = ["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"];
const WEEKDAYS_SHORT_FR: [&str; 7] = ["Dim", "Lun", "Mar", "Mer", "Jeu", "Ven", "Sam"];
const WEEKDAYS_SHORT_JA: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

const WEEKDAYS_FULL_EN: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const WEEKDAYS_FULL_ZH: [&str; 7] = [
    "星期日", "星期一", "星期二", "星期三", "星期四", "星期五", "星期六",
];
const WEEKDAYS_FULL_DE: [&str; 7] = [
    "Sonntag", "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag",
];
const WEEKDAYS_FULL_ES: [&str; 7] = [
    "Domingo", "Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado",
];
const WEEKDAYS_FULL_FR: [&str; 7] = [
    "Dimanche", "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi",
];
const WEEKDAYS_FULL_JA: [&str; 7] = [
    "日曜日", "月曜日", "火曜日", "水曜日", "木曜日", "金曜日", "土曜日",
];

fn months(lang: Language) -> &'static [&'static str; 12] {
    match lang {
        Language::En => &MONTHS_EN,
        Language::Zh => &MONTHS_ZH,
        Language::De => &MONTHS_DE,
        Language::Es => &MONTHS_ES,
        Language::Fr => &MONTHS_FR,
        Language::Ja => &MONTHS_JA,
    }
}

fn weekdays_short(lang: Language) -> &'static [&'static str; 7] {
    match lang {
        Language::En => &WEEKDAYS_SHORT_EN,
        Language::Zh => &WEEKDAYS_SHORT_ZH,
        Language::De => &WEEKDAYS_SHORT_DE,
        Language::Es => &WEEKDAYS_SHORT_ES,
        Language::Fr => &WEEKDAYS_SHORT_FR,
        Language::Ja => &WEEKDAYS_SHORT_JA,
    }
}

fn weekdays_full(lang: Language) -> &'static [&'static str; 7] {
    match lang {
        Language::En => &WEEKDAYS_FULL_EN,
        Language::Zh => &WEEKDAYS_FULL_ZH,
        Language::De => &WEEKDAYS_FULL_DE,
        Language::Es => &WEEKDAYS_FULL_ES,
        Language::Fr => &WEEKDAYS_FULL_FR,
        Language::Ja => &WEEKDAYS_FULL_JA,
    }
}

/// Full month name. `month` is 1-based; out-of-range values are clamped.
pub fn month_name(lang: Language, month: u32) -> &'static str {
    months(lang)[month.clamp(1, 12) as usize - 1]
}

/// All twelve month names in order.
pub fn month_names(lang: Language) -> [&'static str; 12] {
    *months(lang)
}

pub fn weekday_short(lang: Language, day: Weekday) -> &'static str {
    weekdays_short(lang)[day.num_days_from_sunday() as usize]
}

pub fn weekday_full(lang: Language, day: Weekday) -> &'static str {
    weekdays_full(lang)[day.num_days_from_sunday() as usize]
}

/// Column headers for a week grid, rotated so `week_start` comes first.
pub fn weekday_headers(lang: Language, week_start: WeekStart) -> [&'static str; 7] {
    let days = weekdays_short(lang);
    let shift = match week_start {
        WeekStart::Sunday => 0,
        WeekStart::Monday => 1,
    };
    std::array::from_fn(|i| days[(i + shift) % 7])
}
