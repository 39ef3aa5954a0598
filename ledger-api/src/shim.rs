use crate::stub::ChaincodeStub;

pub const OK: i32 = 200;
pub const ERROR: i32 = 500;

/// Outcome of a chaincode invocation: a payload on success, an error
/// message otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Response {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status < 400
    }
}

/// A program installed on peers, invoked once per transaction with a
/// function name and raw byte arguments.
pub trait Chaincode: Send + Sync {
    fn invoke(&self, stub: &mut dyn ChaincodeStub, function: &str, args: &[Vec<u8>]) -> Response;
}
