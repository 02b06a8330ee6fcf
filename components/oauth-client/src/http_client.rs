use std::iter::FromIterator;

use async_trait::async_trait;
use reqwest::{header::{HeaderMap,
                       HeaderName,
                       HeaderValue,
                       ACCEPT,
                       CONTENT_TYPE},
              Client,
              Proxy};
use url::{form_urlencoded,
          Url};

use crate::{error::{Error,
                    Result},
            types::Transport};

const APPLICATION_JSON: &str = "application/json";
const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";

lazy_static! {
    pub static ref ACCEPT_APPLICATION_JSON: (HeaderName, HeaderValue) = (ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    pub static ref CONTENT_TYPE_FORM_URL_ENCODED: (HeaderName, HeaderValue) = (CONTENT_TYPE, HeaderValue::from_static(FORM_URL_ENCODED));
}

#[derive(Clone)]
pub struct HttpClient(Client);

impl HttpClient {
    /// Builds a client for talking to the host behind `url`. `headers` are
    /// sent with every request.
    ///
    /// The proxy is looked up once, from the environment, for the scheme and
    /// host of `url`. It applies to every request the client makes, whatever
    /// host the request goes to.
    pub fn new(url: &str, headers: HeaderMap) -> Result<Self> {
        let mut client = Client::builder();

        trace!("HttpClient: checking proxy for url: {:?}", url);
        let url = Url::parse(url)?;

        if let Some(proxy_url) = env_proxy::for_url(&url).to_string() {
            if url.scheme() == "http" {
                trace!("Setting http_proxy to {}", proxy_url);
                match Proxy::http(&proxy_url) {
                    Ok(p) => {
                        client = client.proxy(p);
                    }
                    Err(e) => warn!("Invalid proxy, err: {:?}", e),
                }
            }

            if url.scheme() == "https" {
                trace!("Setting https proxy to {}", proxy_url);
                match Proxy::https(&proxy_url) {
                    Ok(p) => {
                        client = client.proxy(p);
                    }
                    Err(e) => warn!("Invalid proxy, err: {:?}", e),
                }
            }
        } else {
            trace!("No proxy configured for url: {:?}", url);
        }

        Ok(HttpClient(client.default_headers(headers).build()?))
    }
}

/// Converts configured header pairs into a `HeaderMap`, rejecting names or
/// values that are not valid HTTP.
pub fn header_map<'a, I>(headers: I) -> Result<HeaderMap>
    where I: IntoIterator<Item = (&'a String, &'a String)>
{
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                              Error::InvalidHeader(format!("name={:?}, {}", name, e))
                          })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
                               Error::InvalidHeader(format!("name={:?}, value={:?}, {}",
                                                            name, value, e))
                           })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str, access_token: &str) -> Result<String> {
        let header_values = vec![ACCEPT_APPLICATION_JSON.clone()];
        let headers = HeaderMap::from_iter(header_values.into_iter());

        let resp = self.0
                       .get(url)
                       .headers(headers)
                       .bearer_auth(access_token)
                       .send()
                       .await
                       .map_err(Error::HttpClient)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::HttpClient)?;
        trace!("GET {} response body: {}", url, body);

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::HttpResponse(status, body))
        }
    }

    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let header_values = vec![ACCEPT_APPLICATION_JSON.clone(),
                                 CONTENT_TYPE_FORM_URL_ENCODED.clone()];
        let headers = HeaderMap::from_iter(header_values.into_iter());

        let body = form_urlencoded::Serializer::new(String::new()).extend_pairs(params.iter())
                                                                  .finish();

        let resp = self.0
                       .post(url)
                       .headers(headers)
                       .body(body)
                       .send()
                       .await
                       .map_err(Error::HttpClient)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::HttpClient)?;
        trace!("POST {} response body: {}", url, body);

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::HttpResponse(status, body))
        }
    }
}
