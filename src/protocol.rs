use log::debug;
use serde_json::Value;

use crate::error::Result;

#[cfg(test)]
use std::cell::{Cell, RefCell};

/// Login and device-list host. Commands go to each device's `appServerUrl`.
pub const BASE_URL: &str = "https://wap.tplinkcloud.com";

// Query string and User-Agent the Kasa Android app sends; the cloud rejects
// requests without them.
const APP_PARAMS: &[(&str, &str)] = &[
    ("appName", "Kasa_Android"),
    ("termID", "TermID"),
    ("appVer", "1.4.4.607"),
    ("ospf", "Android+6.0.1"),
    ("netType", "wifi"),
    ("locale", "es_ES"),
];

const USER_AGENT: &str = "Dalvik/2.1.0 (Linux; U; Android 6.0.1; A0001 Build/M4B30X)";

pub fn query_params(token: Option<&str>) -> Vec<(&'static str, &str)> {
    let mut params: Vec<(&'static str, &str)> = APP_PARAMS.to_vec();
    if let Some(token) = token {
        params.push(("token", token));
    }
    params
}

pub trait Protocol {
    fn post(&self, url: &str, token: Option<&str>, body: &Value) -> Result<Value>;
}

pub struct DefaultProtocol {
    http: reqwest::blocking::Client,
}

impl DefaultProtocol {
    pub fn new() -> DefaultProtocol {
        DefaultProtocol {
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl Protocol for DefaultProtocol {
    fn post(&self, url: &str, token: Option<&str>, body: &Value) -> Result<Value> {
        debug!(
            "POST {} method={}",
            url,
            body.get("method").and_then(Value::as_str).unwrap_or("?")
        );
        let response = self
            .http
            .post(url)
            .query(&query_params(token))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .json(body)
            .send()?;

        Ok(response.json()?)
    }
}

#[cfg(test)]
pub struct ProtocolMock {
    req: RefCell<Vec<(String, Option<String>, Value)>>,
    resp: Cell<Result<Value>>,
}

#[cfg(test)]
impl ProtocolMock {
    pub fn new() -> ProtocolMock {
        ProtocolMock {
            req: RefCell::new(Vec::new()),
            resp: Cell::new(Ok(Value::Null)),
        }
    }

    pub fn set_post_return_value(&self, resp: Result<Value>) {
        self.resp.set(resp);
    }
}

#[cfg(test)]
impl Protocol for ProtocolMock {
    fn post(&self, url: &str, token: Option<&str>, body: &Value) -> Result<Value> {
        self.req.borrow_mut().push((
            url.to_string(),
            token.map(String::from),
            body.clone(),
        ));
        self.resp.replace(Ok(Value::Null))
    }
}
