use http_client::Request;

/// Desktop Chrome user agent used unless the config overrides it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Add browser headers for scraping a listing page
pub fn add_page_headers(request: &mut Request, user_agent: &str) {
    let _ = request.insert_header("User-Agent", user_agent);
    let _ = request.insert_header("Accept", PAGE_ACCEPT);
    let _ = request.insert_header("Accept-Language", "en-US,en;q=0.9");
    let _ = request.insert_header("DNT", "1");
    let _ = request.insert_header("Upgrade-Insecure-Requests", "1");
}

/// Add bearer auth and JSON headers for catalog API calls
pub fn add_api_headers(request: &mut Request, access_token: &str) {
    let _ = request.insert_header("Authorization", format!("Bearer {access_token}"));
    let _ = request.insert_header("Accept", "application/json");
    let _ = request.insert_header("Content-Type", "application/json");
}

/// Add headers for the refresh-token grant
pub fn add_token_headers(request: &mut Request, basic_credentials: &str) {
    let _ = request.insert_header("Authorization", format!("Basic {basic_credentials}"));
    let _ = request.insert_header("Content-Type", "application/x-www-form-urlencoded");
}
