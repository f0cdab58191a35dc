//! The cloud client: login, device listing and per-device commands.
use std::{str::FromStr, thread, time::Duration};

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    datatypes::{
        CloudResponse, DeviceData, DeviceInfo, DeviceListResult, LoginResult, PassthroughResult,
        RelayResponse, SysInfo,
    },
    error::{CloudError, Error, Result},
    protocol::{DefaultProtocol, Protocol, BASE_URL},
};

// Cloud error codes meaning the session is gone and a fresh login may fix it.
const TOKEN_EXPIRED: i32 = -20651;
const SESSION_TIMEOUT: i32 = -20675;

fn is_session_error(err: &CloudError) -> bool {
    err.error_code == TOKEN_EXPIRED || err.error_code == SESSION_TIMEOUT
}

/// A blocking client for one Kasa cloud account.
///
/// Owns the credentials and at most one session token. Every operation is a
/// single request/response; the only state mutated between calls is the
/// token, which is replaced by re-login when the cloud reports it expired.
pub struct Client {
    username: String,
    password: String,
    token: Option<String>,
    protocol: Box<dyn Protocol>,
}

impl Client {
    pub fn new(username: &str, password: &str) -> Client {
        Client {
            username: username.to_string(),
            password: password.to_string(),
            token: None,
            protocol: Box::new(DefaultProtocol::new()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Exchange the credentials for a session token.
    ///
    /// Called implicitly by every other operation when no session exists, so
    /// most callers never need it. Calling it again replaces the token.
    pub fn login(&mut self) -> Result<()> {
        let body = json!({
            "method": "login",
            "url": BASE_URL,
            "params": {
                "appType": "Kasa_Android",
                "cloudUserName": self.username,
                "cloudPassword": self.password,
                "terminalUUID": "TermID",
            }
        });
        let response: CloudResponse<LoginResult> =
            serde_json::from_value(self.protocol.post(BASE_URL, None, &body)?)?;
        if let Some(err) = response.error() {
            return Err(Error::Auth(err.to_string()));
        }
        let result = response.into_result()?;
        if result.token.is_empty() {
            return Err(Error::Protocol(String::from("login returned an empty token")));
        }
        self.token = Some(result.token);
        Ok(())
    }

    fn call<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<CloudResponse<T>> {
        let raw = self.protocol.post(url, self.token.as_deref(), body)?;
        Ok(serde_json::from_value(raw)?)
    }

    // Logs in first if there is no session yet, and once more if the cloud
    // reports the token expired. Any other failure surfaces to the caller.
    fn request<T: DeserializeOwned>(&mut self, url: &str, body: &Value) -> Result<T> {
        if self.token.is_none() {
            self.login()?;
        }
        let response = self.call::<T>(url, body)?;
        match response.error() {
            Some(ref err) if is_session_error(err) => {
                debug!("session rejected ({}), logging in again", err.error_code);
                self.login()?;
                let retried = self.call::<T>(url, body)?;
                match retried.error() {
                    Some(err) if is_session_error(&err) => Err(Error::Auth(err.to_string())),
                    _ => retried.into_result(),
                }
            }
            _ => response.into_result(),
        }
    }

    /// Fetch a fresh snapshot of every device on the account.
    pub fn device_list(&mut self) -> Result<Vec<DeviceInfo>> {
        let body = json!({"method": "getDeviceList"});
        let result: DeviceListResult = self.request(BASE_URL, &body)?;
        Ok(result.device_list)
    }

    /// Resolve a device by exact alias, falling back to device id.
    ///
    /// Two devices sharing the requested alias is an error; there is no
    /// tie-break rule.
    pub fn find_device(&mut self, name_or_id: &str) -> Result<DeviceInfo> {
        let devices = self.device_list()?;

        let mut aliased = devices.iter().filter(|device| device.alias == name_or_id);
        match (aliased.next(), aliased.next()) {
            (Some(device), None) => return Ok(device.clone()),
            (Some(_), Some(_)) => {
                return Err(Error::Ambiguous(format!(
                    "several devices are aliased {:?}",
                    name_or_id
                )));
            }
            (None, _) => {}
        }

        devices
            .into_iter()
            .find(|device| device.device_id == name_or_id)
            .ok_or_else(|| {
                Error::NotFound(format!("no device aliased or identified by {:?}", name_or_id))
            })
    }

    /// Post a raw command envelope to the device's control endpoint and
    /// return its `responseData`.
    pub fn passthrough(&mut self, device: &DeviceInfo, request_data: Value) -> Result<Value> {
        let body = json!({
            "method": "passthrough",
            "params": {
                "deviceId": device.device_id,
                "requestData": request_data,
            }
        });
        let result: PassthroughResult = self.request(&device.app_server_url, &body)?;
        Ok(result.response_data)
    }

    pub fn sysinfo(&mut self, name_or_id: &str) -> Result<SysInfo> {
        let device = self.find_device(name_or_id)?;
        self.sysinfo_for(&device)
    }

    fn sysinfo_for(&mut self, device: &DeviceInfo) -> Result<SysInfo> {
        let request = json!({
            "system": {"get_sysinfo": null},
            "emeter": {"get_realtime": null},
        });
        let data: DeviceData = serde_json::from_value(self.passthrough(device, request)?)?;
        Ok(data.sysinfo())
    }

    pub fn set_relay_state(&mut self, name_or_id: &str, on: bool) -> Result<()> {
        let device = self.find_device(name_or_id)?;
        self.set_relay_state_for(&device, on)
    }

    fn set_relay_state_for(&mut self, device: &DeviceInfo, on: bool) -> Result<()> {
        let state = if on { 1 } else { 0 };
        let request = json!({
            "system": {"set_relay_state": {"state": state}}
        });
        let response: RelayResponse = serde_json::from_value(self.passthrough(device, request)?)?;
        response.status()
    }

    pub fn turn_on(&mut self, name_or_id: &str) -> Result<()> {
        self.set_relay_state(name_or_id, true)
    }

    pub fn turn_off(&mut self, name_or_id: &str) -> Result<()> {
        self.set_relay_state(name_or_id, false)
    }

    pub fn is_on(&mut self, name_or_id: &str) -> Result<bool> {
        match self.sysinfo(name_or_id)?.relay_state {
            Some(state) => Ok(state > 0),
            None => Err(Error::Protocol(String::from("device reported no relay state"))),
        }
    }

    pub fn is_off(&mut self, name_or_id: &str) -> Result<bool> {
        Ok(!self.is_on(name_or_id)?)
    }

    /// Turn the device off, wait five seconds, turn it back on.
    pub fn powercycle(&mut self, name_or_id: &str) -> Result<()> {
        self.powercycle_with_delay(name_or_id, Duration::from_secs(5))
    }

    pub fn powercycle_with_delay(&mut self, name_or_id: &str, delay: Duration) -> Result<()> {
        let device = self.find_device(name_or_id)?;
        self.set_relay_state_for(&device, false)?;
        thread::sleep(delay);
        self.set_relay_state_for(&device, true)
    }

    /// Run one [`Command`] against the named device.
    pub fn run(&mut self, command: Command, name_or_id: &str) -> Result<CommandOutcome> {
        match command {
            Command::TurnOn => {
                self.turn_on(name_or_id)?;
                Ok(CommandOutcome::Done)
            }
            Command::TurnOff => {
                self.turn_off(name_or_id)?;
                Ok(CommandOutcome::Done)
            }
            Command::PowerCycle => {
                self.powercycle(name_or_id)?;
                Ok(CommandOutcome::Done)
            }
            Command::SysInfo => Ok(CommandOutcome::Info(self.sysinfo(name_or_id)?)),
            Command::IsOn => Ok(CommandOutcome::State(self.is_on(name_or_id)?)),
            Command::IsOff => Ok(CommandOutcome::State(self.is_off(name_or_id)?)),
        }
    }
}

/// The closed set of per-device commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TurnOn,
    TurnOff,
    PowerCycle,
    SysInfo,
    IsOn,
    IsOff,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Command, String> {
        match s {
            "turnon" => Ok(Command::TurnOn),
            "turnoff" => Ok(Command::TurnOff),
            "powercycle" => Ok(Command::PowerCycle),
            "sysinfo" => Ok(Command::SysInfo),
            "ison" => Ok(Command::IsOn),
            "isoff" => Ok(Command::IsOff),
            _ => Err(format!("unknown command: {}", s)),
        }
    }
}

#[derive(Debug)]
pub enum CommandOutcome {
    Done,
    State(bool),
    Info(SysInfo),
}
