//! Outbound links: the Google Earth measuring link and results deep links.

use url::Url;

use crate::models::FormRecord;

const GOOGLE_EARTH_WEB: &str = "https://earth.google.com/web/";
const GOOGLE_EARTH_SEARCH: &str = "https://earth.google.com/web/search/";

/// Google Earth link for measuring the roof. Prefers the coordinate, then
/// the typed address, then the bare web app.
pub fn google_earth_link(form: &FormRecord) -> String {
    if let Some(coordinate) = form.coordinate() {
        return format!(
            "{}{}",
            GOOGLE_EARTH_SEARCH,
            urlencoding::encode(&coordinate.to_string())
        );
    }
    let location = form.location.trim();
    if !location.is_empty() {
        return format!("{}{}", GOOGLE_EARTH_SEARCH, urlencoding::encode(location));
    }
    GOOGLE_EARTH_WEB.to_string()
}

/// Results page link for an assessment id: `<base>?id=<id>`.
pub fn results_link(base: &Url, id: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().clear().append_pair("id", id);
    url
}
