//! Inline keyboard builders and callback-data formats.
//!
//! Callback data formats, shared with the update handler:
//! - `region:{name}` — region selected
//! - `change_region` — show the region keyboard again
//! - `done:{date}:{prayer}` / `qazo:{date}:{prayer}` — post-check verdicts
//! - `clear_qazo` — wipe the missed-prayer log

use chrono::NaiveDate;

use super::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::features::prayer_times::Prayer;

/// The thirteen regions the schedule API knows about.
pub const REGIONS: [&str; 13] = [
    "Toshkent",
    "Andijon",
    "Fargona",
    "Namangan",
    "Samarqand",
    "Buxoro",
    "Navoiy",
    "Qashqadaryo",
    "Surxondaryo",
    "Jizzax",
    "Sirdaryo",
    "Xorazm",
    "Qoraqalpog‘iston",
];

/// One button per region, one region per row.
pub fn regions_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: REGIONS
            .iter()
            .map(|region| vec![InlineKeyboardButton::new(*region, format!("region:{region}"))])
            .collect(),
    }
}

/// Single button offering to change region.
pub fn change_region_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton::new(
            "📍 Viloyatni o'zgartirish",
            "change_region",
        )]],
    }
}

/// Done/missed verdict buttons for a post-check prompt, correlated on
/// `(date, prayer)`.
pub fn post_check_keyboard(date: NaiveDate, prayer: Prayer) -> InlineKeyboardMarkup {
    let date = date.format("%Y-%m-%d");
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::new(
                "✅ O'qidim",
                format!("done:{date}:{prayer}"),
            )],
            vec![InlineKeyboardButton::new(
                "❌ Qazo bo'ldi",
                format!("qazo:{date}:{prayer}"),
            )],
        ],
    }
}

/// Clear button shown under the missed-prayer list.
pub fn clear_missed_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton::new(
            "❌ Qazolarni tozalash",
            "clear_qazo",
        )]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_keyboard_has_one_row_per_region() {
        let kb = regions_keyboard();
        assert_eq!(kb.inline_keyboard.len(), REGIONS.len());
        assert_eq!(kb.inline_keyboard[0][0].callback_data, "region:Toshkent");
    }

    #[test]
    fn test_region_names_match_the_schedule_api() {
        // The region string doubles as the API path key, so the spelling
        // (including the okina in Qoraqalpog‘iston) must match exactly
        assert!(REGIONS.contains(&"Qoraqalpog‘iston"));
        // No region name may collide with the callback separator
        assert!(REGIONS.iter().all(|r| !r.contains(':')));
    }

    #[test]
    fn test_post_check_keyboard_correlation_keys() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let kb = post_check_keyboard(date, Prayer::Peshin);

        assert_eq!(kb.inline_keyboard.len(), 2);
        assert_eq!(
            kb.inline_keyboard[0][0].callback_data,
            "done:2025-03-10:Peshin"
        );
        assert_eq!(
            kb.inline_keyboard[1][0].callback_data,
            "qazo:2025-03-10:Peshin"
        );
    }
}
