//! Local field strategies: no model calls, deterministic output.

pub mod keyword;
pub mod patterns;
pub mod position;
pub mod regex;

pub use self::keyword::{KeywordStrategy, KEYWORD_CONFIDENCE, KEYWORD_WINDOW};
pub use self::position::PositionStrategy;
pub use self::regex::{RegexStrategy, REGEX_CONFIDENCE};
