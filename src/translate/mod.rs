pub mod cli;
pub mod client;
pub mod factory;
pub mod interface;

pub use factory::TranslatorFactory;
pub use interface::{
    PdfTranslator, RequestRejection, TranslateError, TranslateJob, TranslationOutput,
    TranslationRequest, TranslationResponse,
};
