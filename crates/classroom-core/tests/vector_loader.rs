//! JSON test vector loader shared by protocol tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TestVector {
    pub description: String,
    /// Either the frame as a JSON object, or a string sent verbatim.
    pub frame: serde_json::Value,
    #[serde(default)]
    pub expect: Option<serde_json::Value>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
}

impl TestVector {
    /// Text exactly as a client would put it on the socket.
    pub fn wire_text(&self) -> String {
        match &self.frame {
            serde_json::Value::String(raw) => raw.clone(),
            other => serde_json::to_string(other).expect("re-encode vector frame"),
        }
    }
}

pub fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}
