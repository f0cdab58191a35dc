use crate::error::{CloudError, Error, Result};

/// Envelope the cloud wraps every response in. `error_code` zero means
/// success and `result` is present; anything else comes with a `msg`.
#[derive(Debug, Deserialize, Clone)]
pub struct CloudResponse<T> {
    pub error_code: i32,
    pub msg: Option<String>,
    pub result: Option<T>,
}

impl<T> CloudResponse<T> {
    pub fn error(&self) -> Option<CloudError> {
        if self.error_code == 0 {
            None
        } else {
            Some(CloudError {
                error_code: self.error_code,
                msg: self.msg.clone().unwrap_or_default(),
            })
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self.error() {
            Some(err) => Err(Error::from(err)),
            None => self
                .result
                .ok_or_else(|| Error::Protocol(String::from("envelope carried no result"))),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoginResult {
    pub token: String,
    #[serde(rename = "accountId")]
    pub account_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceListResult {
    #[serde(rename = "deviceList")]
    pub device_list: Vec<DeviceInfo>,
}

/// One entry of `getDeviceList`. A transient snapshot; nothing caches it.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeviceInfo {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    pub alias: String,
    #[serde(rename = "deviceName")]
    pub device_name: String,
    #[serde(rename = "deviceModel")]
    pub device_model: String,
    #[serde(rename = "deviceType")]
    pub device_type: String,
    /// Per-device control endpoint; commands go here, not to the login host.
    #[serde(rename = "appServerUrl")]
    pub app_server_url: String,
    pub status: i32,
    #[serde(rename = "deviceMac")]
    pub device_mac: Option<String>,
    #[serde(rename = "deviceHwVer")]
    pub hw_ver: Option<String>,
    #[serde(rename = "fwVer")]
    pub fw_ver: Option<String>,
    pub role: Option<i32>,
}

impl DeviceInfo {
    pub fn is_online(&self) -> bool {
        self.status == 1
    }

    pub fn kind(&self) -> DeviceKind {
        if self.device_type == "IOT.SMARTBULB" {
            DeviceKind::Bulb
        } else if self.device_type == "IOT.SMARTPLUGSWITCH" {
            // HS2xx are in-wall switches, the rest of the family are plugs.
            if self.device_model.starts_with("HS2") {
                DeviceKind::WallSwitch
            } else {
                DeviceKind::Plug
            }
        } else {
            DeviceKind::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Plug,
    WallSwitch,
    Bulb,
    Other,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PassthroughResult {
    #[serde(rename = "responseData")]
    pub response_data: serde_json::Value,
}

/// `responseData` of a sysinfo passthrough.
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceData {
    pub system: System,
    pub emeter: Option<SectionResult<Emeter>>,
}

impl DeviceData {
    pub fn sysinfo(self) -> SysInfo {
        self.system.sysinfo
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct System {
    #[serde(rename = "get_sysinfo")]
    pub sysinfo: SysInfo,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SysInfo {
    pub alias: String,
    pub model: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(alias = "type")]
    #[serde(alias = "mic_type")]
    pub hw_type: Option<String>,
    pub sw_ver: Option<String>,
    pub hw_ver: Option<String>,
    #[serde(alias = "mic_mac")]
    pub mac: Option<String>,
    #[serde(alias = "description")]
    pub dev_name: Option<String>,
    pub relay_state: Option<u8>,
    pub on_time: Option<i64>,
    pub feature: Option<String>,
    pub rssi: Option<i32>,
    pub active_mode: Option<String>,
    pub led_off: Option<u8>,
    pub err_code: i32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SectionResult<T> {
    Ok(T),
    Err(SectionStatus),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Emeter {
    #[serde(rename = "get_realtime")]
    pub realtime: EmeterRealtime,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmeterRealtime {
    pub current: Option<f64>,
    pub voltage: Option<f64>,
    pub power: Option<f64>,
    pub total: Option<f64>,
    pub err_code: i32,
}

/// `responseData` of a relay-state passthrough.
#[derive(Debug, Deserialize, Clone)]
pub struct RelayResponse {
    pub system: RelaySystem,
}

impl RelayResponse {
    pub fn status(&self) -> Result<()> {
        self.system.set_relay_state.ok()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelaySystem {
    #[serde(rename = "set_relay_state")]
    pub set_relay_state: SectionStatus,
}

/// Per-section status a device reports inside `responseData`.
#[derive(Debug, Deserialize, Clone)]
pub struct SectionStatus {
    pub err_code: i32,
    pub err_msg: Option<String>,
}

impl SectionStatus {
    pub fn ok(&self) -> Result<()> {
        if self.err_code == 0 {
            Ok(())
        } else {
            Err(Error::Device(CloudError {
                error_code: self.err_code,
                msg: self.err_msg.clone().unwrap_or_default(),
            }))
        }
    }
}
