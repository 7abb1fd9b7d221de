//! Document handling: format detection and normalization into a
//! [`ParsedDocument`](crate::models::document::ParsedDocument).

mod detect;
mod normalize;
mod spreadsheet;
mod transport;

pub use detect::detect;
pub use normalize::{image_payload, normalize_excel, normalize_word, DocumentNormalizer, READ_DOCUMENT_PROMPT};
pub use spreadsheet::{read_workbook, render_sheets};
pub use transport::{decode_base64, sniff_media_type, split_data_url};
