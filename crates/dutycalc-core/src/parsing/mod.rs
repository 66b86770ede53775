pub mod code;
pub mod dates;
pub mod legacy;
pub mod rate;

pub use code::normalize_code;
pub use dates::{format_display_date, parse_instant};
pub use legacy::{parse_legacy_additional_duty, LegacyDuty};
pub use rate::{decimal_from_json, parse_decimal_lenient, parse_rate_text, ParsedRate, PerUnitRate};
