//! Protocol constants of the "Exchange2010" soap autodiscover service.

/// Namespace of the autodiscover request and response elements.
pub const AUTODISCOVER_NS: &str = "http://schemas.microsoft.com/exchange/2010/Autodiscover";

/// Namespace of the soap envelope.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace of the ws-addressing header elements.
pub const ADDRESSING_NS: &str = "http://www.w3.org/2005/08/addressing";

/// Action uri of the `GetUserSettings` operation.
pub const GET_USER_SETTINGS_ACTION: &str =
    "http://schemas.microsoft.com/exchange/2010/Autodiscover/Autodiscover/GetUserSettings";

/// Protocol version every request asks the server to speak.
pub const SERVER_VERSION: &str = "Exchange2010";

/// Setting holding the external ews endpoint url, requested on every call.
pub const EWS_URL_SETTING: &str = "ExternalEwsUrl";

/// Path of the soap autodiscover service on every candidate host.
pub const SVC_PATH: &str = "/autodiscover/autodiscover.svc";

/// Service name prefix of the autodiscover SRV lookup.
pub const SRV_NAME_PREFIX: &str = "_autodiscover._tcp";
