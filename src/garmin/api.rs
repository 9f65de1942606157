use chrono::NaiveDate;
use curl::easy::{Easy, List};
use serde::de::DeserializeOwned;

use crate::{
    data_types::garmin::{BodyComposition, GarminActivity},
    errors::{ProgressError, Result},
    logln, logvbln,
    util::DateTimeUtils,
};

use super::{
    auth::{self, Credentials, CONNECT_URL, SSO_URL},
    FitnessAccount,
};

const PROXY_URL: &str = "https://connect.garmin.com/modern/proxy";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Garmin Connect web client. One curl handle is reused so the session
/// cookies set during login ride along with every later request.
pub struct GarminApi {
    handle: Easy,
    credentials: Credentials,
}

impl GarminApi {
    const CC: &'static str = "GarminApi";

    pub fn new(credentials: Credentials) -> Result<Self> {
        let mut handle = Easy::new();

        // Empty path enables the in-memory cookie engine.
        handle.cookie_file("").map_err(transport)?;
        handle.follow_location(true).map_err(transport)?;
        handle.useragent(USER_AGENT).map_err(transport)?;

        Ok(Self { handle, credentials })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    fn get(&mut self, url: &str, headers: &[&str]) -> std::result::Result<(u32, Vec<u8>), curl::Error> {
        self.handle.get(true)?;
        self.handle.url(url)?;
        self.perform(headers)
    }

    fn post_form(
        &mut self,
        url: &str,
        form: &str,
        headers: &[&str],
    ) -> std::result::Result<(u32, Vec<u8>), curl::Error> {
        self.handle.post(true)?;
        self.handle.url(url)?;
        self.handle.post_fields_copy(form.as_bytes())?;
        self.perform(headers)
    }

    fn perform(&mut self, headers: &[&str]) -> std::result::Result<(u32, Vec<u8>), curl::Error> {
        let mut list = List::new();
        for header in headers {
            list.append(header)?;
        }
        self.handle.http_headers(list)?;

        let mut buffer_response = Vec::new();
        {
            let mut transfer = self.handle.transfer();
            transfer.write_function(|data| {
                buffer_response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        Ok((self.handle.response_code()?, buffer_response))
    }

    fn encode(&mut self, pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, self.handle.url_encode(value.as_bytes())))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn api_request<T: DeserializeOwned>(&mut self, path: &str) -> Result<T> {
        let url = format!("{}/{}", PROXY_URL, path);
        logvbln!("GET {}", url);

        let (status, body) = self.get(&url, &["NK: NT", "Accept: application/json"]).map_err(transport)?;

        match status {
            200..=299 => serde_json::from_slice(&body).map_err(|err| {
                ProgressError::DataUnavailable(format!("unexpected payload from {}: {}", path, err))
            }),
            401 | 403 => Err(ProgressError::Auth(format!("session rejected by {} ({})", path, status))),
            _ => Err(ProgressError::DataUnavailable(format!("{} answered {}", path, status))),
        }
    }
}

fn transport(err: curl::Error) -> ProgressError {
    ProgressError::DataUnavailable(format!("transport error: {}", err))
}

impl FitnessAccount for GarminApi {
    fn login(&mut self) -> Result<()> {
        let params = auth::signin_params();
        let query = self.encode(&params);
        let signin_url = format!("{}/signin?{}", SSO_URL, query);

        // The first visit hands out the cookies the form post expects.
        self.get(&signin_url, &[]).map_err(|err| ProgressError::Auth(err.to_string()))?;

        let email = self.credentials.email.clone();
        let password = self.credentials.password.clone();
        let form = self.encode(&[
            ("username", email.as_str()),
            ("password", password.as_str()),
            ("embed", "false"),
        ]);
        let referer = format!("Referer: {}", signin_url);

        let (status, page) = self
            .post_form(
                &signin_url,
                &form,
                &[
                    "Origin: https://sso.garmin.com",
                    referer.as_str(),
                    "Content-Type: application/x-www-form-urlencoded",
                ],
            )
            .map_err(|err| ProgressError::Auth(err.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ProgressError::Auth(format!("sign-in answered {}", status)));
        }

        let ticket = auth::extract_ticket(&String::from_utf8_lossy(&page))
            .ok_or_else(|| ProgressError::Auth("no service ticket in sign-in response".to_string()))?;

        let (status, _) = self
            .get(&format!("{}?ticket={}", CONNECT_URL, ticket), &[])
            .map_err(|err| ProgressError::Auth(err.to_string()))?;

        if !(200..400).contains(&status) {
            return Err(ProgressError::Auth(format!("ticket exchange answered {}", status)));
        }

        logln!("logged in as {}", self.credentials.email);
        Ok(())
    }

    fn recent_activities(&mut self, count: usize) -> Result<Vec<GarminActivity>> {
        self.api_request(&format!(
            "activitylist-service/activities/search/activities?start=0&limit={}",
            count
        ))
    }

    fn body_composition(&mut self, start: NaiveDate, end: NaiveDate) -> Result<BodyComposition> {
        self.api_request(&format!(
            "weight-service/weight/dateRange?startDate={}&endDate={}",
            DateTimeUtils::to_str(start),
            DateTimeUtils::to_str(end)
        ))
    }
}
