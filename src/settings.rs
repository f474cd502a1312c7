use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::EWS_URL_SETTING;
#[cfg(feature = "json")]
use crate::error::Error;
use crate::error::{ErrorKind, Result};
use crate::failed;
use crate::xml::Node;

/// The flattened name to value mapping of a discovery response.
pub type Settings = HashMap<String, String>;

/// The shaped outcome of a discovery call: a bare url when no settings were
/// requested, the full settings map otherwise.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AutodiscoverResult {
    Url(String),
    Settings(Settings),
}

impl AutodiscoverResult {
    /// The external ews endpoint url, however the result was shaped.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Settings(settings) => settings.get(EWS_URL_SETTING).map(String::as_str),
        }
    }

    /// The full settings map, if any settings were requested.
    pub fn settings(&self) -> Option<&Settings> {
        match self {
            Self::Url(_) => None,
            Self::Settings(settings) => Some(settings),
        }
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|_| {
            Error::new(
                ErrorKind::SerializeJSON,
                "Failed to serialize the discovery result",
            )
        })
    }
}

/// Path from the envelope to the user settings list in a normalized
/// response tree.
const USER_SETTINGS_PATH: [&str; 6] = [
    "body",
    "getUserSettingsResponseMessage",
    "response",
    "userResponses",
    "userResponse",
    "userSettings",
];

/// Folds the `userSetting` entries of a normalized response into a settings
/// map. A single entry and a list of entries are treated the same, the last
/// value wins when the server repeats a name.
pub(crate) fn extract_settings(root: &Node) -> Result<Settings> {
    if root.name() != "envelope" {
        failed!(
            ErrorKind::MalformedResponse,
            "Expected a soap envelope, found {}",
            root.name()
        );
    }

    let mut node = root;

    for name in USER_SETTINGS_PATH {
        node = match node.child(name) {
            Some(child) => child,
            None => failed!(
                ErrorKind::MalformedResponse,
                "Response is missing {} on the user settings path",
                name
            ),
        };
    }

    let mut settings = Settings::new();

    for entry in node.all("userSetting") {
        let name = entry.child("name").and_then(|name| name.value());
        let value = entry.child("value").and_then(|value| value.value());

        if let (Some(name), Some(value)) = (name, value) {
            settings.insert(name.to_string(), value.to_string());
        }
    }

    if settings.is_empty() {
        failed!(
            ErrorKind::MalformedResponse,
            "Response did not contain any user setting"
        );
    }

    Ok(settings)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::xml;

    fn response(user_settings: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" \
             xmlns:a=\"http://schemas.microsoft.com/exchange/2010/Autodiscover\">\
             <s:Header><a:ServerVersionInfo/></s:Header>\
             <s:Body>\
             <GetUserSettingsResponseMessage xmlns=\"http://schemas.microsoft.com/exchange/2010/Autodiscover\">\
             <Response>\
             <ErrorCode>NoError</ErrorCode>\
             <UserResponses><UserResponse>\
             <UserSettings>{}</UserSettings>\
             </UserResponse></UserResponses>\
             </Response>\
             </GetUserSettingsResponseMessage>\
             </s:Body>\
             </s:Envelope>",
            user_settings
        )
    }

    #[test]
    fn folds_user_settings_into_a_map() {
        let raw = response(
            "<UserSetting i:type=\"a:StringSetting\">\
             <Name>ExternalEwsUrl</Name>\
             <Value>https://outlook.example.com/ews/exchange.asmx</Value>\
             </UserSetting>\
             <UserSetting i:type=\"a:StringSetting\">\
             <Name>ExternalEwsVersion</Name>\
             <Value>15.20.4200.12</Value>\
             </UserSetting>",
        );

        let settings = extract_settings(&xml::parse(raw).unwrap()).unwrap();

        assert_eq!(2, settings.len());
        assert_eq!(
            Some(&"https://outlook.example.com/ews/exchange.asmx".to_string()),
            settings.get("ExternalEwsUrl")
        );
    }

    #[test]
    fn a_single_scalar_setting_still_folds() {
        let raw = response(
            "<UserSetting><Name>ExternalEwsUrl</Name><Value>https://a/ews</Value></UserSetting>",
        );

        let settings = extract_settings(&xml::parse(raw).unwrap()).unwrap();

        assert_eq!(1, settings.len());
    }

    #[test]
    fn the_last_value_wins_on_duplicate_names() {
        let raw = response(
            "<UserSetting><Name>CasVersion</Name><Value>first</Value></UserSetting>\
             <UserSetting><Name>CasVersion</Name><Value>second</Value></UserSetting>",
        );

        let settings = extract_settings(&xml::parse(raw).unwrap()).unwrap();

        assert_eq!(Some(&"second".to_string()), settings.get("CasVersion"));
    }

    #[test]
    fn an_error_response_is_reported_as_malformed() {
        // A redirect or error answer has no user settings below the body.
        let raw = "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\">\
                   <s:Body>\
                   <GetUserSettingsResponseMessage>\
                   <Response><ErrorCode>RedirectAddress</ErrorCode></Response>\
                   </GetUserSettingsResponseMessage>\
                   </s:Body>\
                   </s:Envelope>";

        let error = extract_settings(&xml::parse(raw).unwrap()).unwrap_err();

        assert!(matches!(error.kind(), ErrorKind::MalformedResponse));
    }

    #[test]
    fn a_non_envelope_root_is_malformed() {
        let error = extract_settings(&xml::parse("<Other/>").unwrap()).unwrap_err();

        assert!(matches!(error.kind(), ErrorKind::MalformedResponse));
    }

    #[test]
    fn the_url_accessor_reads_both_shapes() {
        let url = AutodiscoverResult::Url("https://a/ews".to_string());

        assert_eq!(Some("https://a/ews"), url.url());
        assert!(url.settings().is_none());

        let mut map = Settings::new();
        map.insert(EWS_URL_SETTING.to_string(), "https://b/ews".to_string());

        let settings = AutodiscoverResult::Settings(map);

        assert_eq!(Some("https://b/ews"), settings.url());
        assert!(settings.settings().is_some());
    }

    #[cfg(feature = "json")]
    #[test]
    fn serializes_the_bare_url_as_a_json_string() {
        let result = AutodiscoverResult::Url("https://a/ews".to_string());

        assert_eq!("\"https://a/ews\"", result.to_json().unwrap());
    }
}
