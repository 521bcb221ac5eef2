#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod normalize;
pub mod qa_table;
pub mod resolver;
pub mod span;
pub mod traits;
pub mod types;

pub use dataset::DatasetBuilder;
pub use error::{Error, Result};
pub use normalize::{normalize, TextNormalizer};
pub use qa_table::{load_qa_table, QaTable};
pub use resolver::AnswerResolver;
pub use traits::QaModel;
