pub mod buffer;
pub mod message;
pub mod response;

pub use message::build_query;
pub use response::{
    decode_response, spoof_response, Answer, AnswerData, DecodedResponse, ResponseFlags,
};
