//! Provider wire formats
//!
//! Only the fields the translators write and the normalizers read are
//! modelled; everything else the vendors send is ignored on deserialize.

pub mod anthropic;
pub mod azure;
pub mod bge;
pub mod cohere;
pub mod google;
pub mod huggingface;
pub mod openai;
