use crate::constants::{
    ADDRESSING_NS, AUTODISCOVER_NS, EWS_URL_SETTING, GET_USER_SETTINGS_ACTION, SERVER_VERSION,
    SOAP_ENVELOPE_NS,
};

/// Renders the body of a `GetUserSettings` request for a single mailbox.
///
/// The ews endpoint url setting is part of every request: it is appended
/// when the caller did not ask for it and rendered only once when the
/// caller asked for it more than once. The email address is not escaped,
/// the caller is expected to have validated it first.
pub fn user_settings_request<E: AsRef<str>, S: AsRef<str>>(email: E, settings: &[S]) -> String {
    let mut requested: Vec<&str> = Vec::with_capacity(settings.len() + 1);

    for setting in settings {
        let setting = setting.as_ref();

        if setting == EWS_URL_SETTING && requested.contains(&EWS_URL_SETTING) {
            continue;
        }

        requested.push(setting);
    }

    if !requested.contains(&EWS_URL_SETTING) {
        requested.push(EWS_URL_SETTING);
    }

    let mut settings_list = String::new();

    for setting in requested {
        settings_list.push_str("<a:Setting>");
        settings_list.push_str(setting);
        settings_list.push_str("</a:Setting>");
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:a=\"{AUTODISCOVER_NS}\" xmlns:wsa=\"{ADDRESSING_NS}\" xmlns:soap=\"{SOAP_ENVELOPE_NS}\">\
         <soap:Header>\
         <a:RequestedServerVersion>{SERVER_VERSION}</a:RequestedServerVersion>\
         <wsa:Action>{GET_USER_SETTINGS_ACTION}</wsa:Action>\
         </soap:Header>\
         <soap:Body>\
         <a:GetUserSettingsRequestMessage>\
         <a:Request>\
         <a:Users><a:User><a:Mailbox>{email}</a:Mailbox></a:User></a:Users>\
         <a:RequestedSettings>{settings_list}</a:RequestedSettings>\
         </a:Request>\
         </a:GetUserSettingsRequestMessage>\
         </soap:Body>\
         </soap:Envelope>",
        email = email.as_ref(),
    )
}
