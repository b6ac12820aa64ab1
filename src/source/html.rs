// src/source/html.rs
// =============================================================================
// DataSource backed by plain HTTP + HTML parsing.
//
// Pages used:
// - Profile:  <profile_base>/<account>?lang=en
// - Listing:  <listing_base>/<account>/following?lang=en  (or /followers)
//
// The listing pages are paginated with a "more" link at the bottom of the
// user list. advance() follows that link; when it is gone, the listing is
// exhausted.
//
// All HTML parsing happens in the plain functions at the bottom of this file
// (parse_profile, parse_usernames, find_more_link). scraper's Html type is
// not Send, so it never lives across an .await.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{DataSource, ListingHandle, ListingKind};
use crate::account::{AccountId, Profile};
use crate::config::SourceConfig;
use crate::error::{CrawlError, Result};

pub struct HtmlSource {
    client: Client,
    config: SourceConfig,
}

impl HtmlSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CrawlError::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn profile_url(&self, account: &AccountId) -> Result<Url> {
        join(&self.config.profile_base, &format!("{}?lang=en", account))
    }

    fn listing_url(&self, account: &AccountId, kind: ListingKind) -> Result<Url> {
        join(
            &self.config.listing_base,
            &format!("{}/{}?lang=en", account, kind.path_segment()),
        )
    }

    // Fetches a page and returns its HTML. Any transport error or non-2xx
    // status becomes SourceUnavailable for `account`.
    async fn get_page(&self, account: &AccountId, url: &Url) -> Result<String> {
        debug!(account = %account, url = %url, "fetching page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CrawlError::source(account, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::source(account, format!("HTTP {} from {}", status, url)));
        }

        response.text().await.map_err(|e| CrawlError::source(account, e))
    }
}

#[async_trait]
impl DataSource for HtmlSource {
    async fn fetch_profile(&mut self, account: &AccountId) -> Result<Profile> {
        let url = self.profile_url(account)?;
        let html = self.get_page(account, &url).await?;
        Ok(parse_profile(&html))
    }

    async fn open_listing<'a>(
        &'a mut self,
        account: &AccountId,
        kind: ListingKind,
    ) -> Result<Box<dyn ListingHandle + 'a>> {
        let url = self.listing_url(account, kind)?;
        let html = self.get_page(account, &url).await?;

        Ok(Box::new(HtmlListing {
            source: self,
            account: account.clone(),
            url,
            html,
        }))
    }
}

// One open listing: the page we are currently looking at
struct HtmlListing<'a> {
    source: &'a HtmlSource,
    account: AccountId,
    url: Url,
    html: String,
}

#[async_trait]
impl<'a> ListingHandle for HtmlListing<'a> {
    async fn extract_visible(&mut self) -> Result<Vec<AccountId>> {
        Ok(parse_usernames(&self.html))
    }

    async fn advance(&mut self) -> Result<bool> {
        let next = match find_more_link(&self.html, &self.url) {
            Some(url) => url,
            None => return Ok(false),
        };

        self.html = self.source.get_page(&self.account, &next).await?;
        self.url = next;
        Ok(true)
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| CrawlError::InvalidConfig(format!("cannot build URL from {}: {}", base, e)))
}

// Constant selectors; parsing them cannot fail at runtime
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    document.select(&selector(css)).next()
}

fn first_text(document: &Html, css: &str) -> String {
    first(document, css).map(text_of).unwrap_or_default()
}

fn first_attr(document: &Html, css: &str, attr: &str) -> String {
    first(document, css)
        .and_then(|e| e.value().attr(attr))
        .unwrap_or_default()
        .to_string()
}

fn first_count(document: &Html, css: &str) -> u64 {
    first(document, css)
        .and_then(|e| e.value().attr("data-count"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Extracts profile metadata from a profile page. Missing fields are left
/// at their defaults.
pub fn parse_profile(html: &str) -> Profile {
    let document = Html::parse_document(html);

    Profile {
        id: first(&document, ".ProfileNav")
            .and_then(|e| e.value().attr("data-user-id"))
            .and_then(|v| v.parse().ok()),
        username: first_text(&document, ".ProfileHeaderCard > h2 > a > span > b"),
        fullname: first_text(&document, ".ProfileHeaderCard > h1 > a"),
        bio: first_text(&document, ".ProfileHeaderCard > p"),
        location: first_text(&document, ".ProfileHeaderCard-locationText.u-dir"),
        url: first_attr(&document, ".ProfileHeaderCard-urlText.u-dir > a", "title"),
        avatar: first_attr(&document, ".ProfileCanopy-avatar > div > a > img", "src"),
        background: first_attr(&document, ".ProfileCanopy-headerBg > img", "src"),
        verified: first(&document, ".ProfileHeaderCard > h1 > span > a > span").is_some(),
        tweets: first_count(&document, ".ProfileNav-item--tweets > a > span.ProfileNav-value"),
        following: first_count(&document, ".ProfileNav-item--following > a > span.ProfileNav-value"),
        followers: first_count(&document, ".ProfileNav-item--followers > a > span.ProfileNav-value"),
        likes: first_count(&document, ".ProfileNav-item--favorites > a > span.ProfileNav-value"),
        joined: first_attr(&document, ".ProfileHeaderCard-joinDateText.js-tooltip.u-dir", "title"),
    }
}

/// Usernames shown on a listing page, normalized, in page order.
pub fn parse_usernames(html: &str) -> Vec<AccountId> {
    let document = Html::parse_document(html);

    document
        .select(&selector(".user-item .username"))
        .filter_map(|element| {
            let raw = text_of(element);
            match AccountId::parse(&raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    debug!(raw = %raw, "skipping unparseable username");
                    None
                }
            }
        })
        .collect()
}

/// The absolute URL of the "load more" link, if the page has one.
pub fn find_more_link(html: &str, page_url: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let href = first(&document, "div.user-list > div > a")?.value().attr("href")?;
    page_url.join(href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_PAGE: &str = r#"
        <html><body>
          <div class="ProfileCanopy-headerBg"><img src="https://img.example/bg.png"></div>
          <div class="ProfileCanopy-avatar"><div><a><img src="https://img.example/a.png"></a></div></div>
          <div class="ProfileNav" data-user-id="12345">
            <ul>
              <li class="ProfileNav-item--tweets"><a><span class="ProfileNav-value" data-count="42">42</span></a></li>
              <li class="ProfileNav-item--following"><a><span class="ProfileNav-value" data-count="7">7</span></a></li>
              <li class="ProfileNav-item--followers"><a><span class="ProfileNav-value" data-count="1001">1K</span></a></li>
            </ul>
          </div>
          <div class="ProfileHeaderCard">
            <h1><a>Alice Example</a><span><a><span>verified</span></a></span></h1>
            <h2><a><span>@<b>alice</b></span></a></h2>
            <p> Writes Rust. </p>
            <span class="ProfileHeaderCard-locationText u-dir">Berlin</span>
            <span class="ProfileHeaderCard-urlText u-dir"><a title="https://alice.example">alice.example</a></span>
            <span class="ProfileHeaderCard-joinDateText js-tooltip u-dir" title="9:15 AM - 3 Mar 2011">Joined March 2011</span>
          </div>
        </body></html>
    "#;

    const LISTING_PAGE: &str = r#"
        <html><body>
          <div class="user-list">
            <div class="user-item"><span class="username">@Bob</span></div>
            <div class="user-item"><span class="username">@carol_1</span></div>
            <div class="user-item"><span class="username">@</span></div>
            <div class="w-button-more"><a href="/alice/following?cursor=abc">Show more people</a></div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_profile_fields() {
        let profile = parse_profile(PROFILE_PAGE);
        assert_eq!(profile.id, Some(12345));
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.fullname, "Alice Example");
        assert_eq!(profile.bio, "Writes Rust.");
        assert_eq!(profile.location, "Berlin");
        assert_eq!(profile.url, "https://alice.example");
        assert_eq!(profile.avatar, "https://img.example/a.png");
        assert_eq!(profile.background, "https://img.example/bg.png");
        assert!(profile.verified);
        assert_eq!(profile.tweets, 42);
        assert_eq!(profile.following, 7);
        assert_eq!(profile.followers, 1001);
        assert_eq!(profile.likes, 0);
        assert_eq!(profile.joined, "9:15 AM - 3 Mar 2011");
    }

    #[test]
    fn test_parse_profile_empty_page() {
        assert_eq!(parse_profile("<html></html>"), Profile::default());
    }

    #[test]
    fn test_parse_usernames_normalizes_and_skips_bad_entries() {
        let ids: Vec<String> = parse_usernames(LISTING_PAGE)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["bob", "carol_1"]);
    }

    #[test]
    fn test_find_more_link_resolves_relative_href() {
        let page = Url::parse("https://m.example.com/alice/following?lang=en").unwrap();
        let next = find_more_link(LISTING_PAGE, &page).unwrap();
        assert_eq!(next.as_str(), "https://m.example.com/alice/following?cursor=abc");
    }

    #[test]
    fn test_last_page_has_no_more_link() {
        let page = Url::parse("https://m.example.com/alice/following").unwrap();
        let html = r#"<div class="user-list"><div class="user-item"><span class="username">@bob</span></div></div>"#;
        assert_eq!(find_more_link(html, &page), None);
    }

    #[test]
    fn test_urls_built_from_bases() {
        let config = SourceConfig::new("https://twitter.example", "https://m.twitter.example/").unwrap();
        let source = HtmlSource::new(config).unwrap();
        let alice = AccountId::parse("alice").unwrap();

        assert_eq!(
            source.profile_url(&alice).unwrap().as_str(),
            "https://twitter.example/alice?lang=en"
        );
        assert_eq!(
            source.listing_url(&alice, ListingKind::Followers).unwrap().as_str(),
            "https://m.twitter.example/alice/followers?lang=en"
        );
    }
}
