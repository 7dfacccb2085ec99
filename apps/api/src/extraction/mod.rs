// Text extraction: one reader per upload format, chosen by file extension.

pub mod docx;
pub mod ocr;
pub mod text_extractor;
