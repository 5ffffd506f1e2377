use crate::config::SiteConfig;
use crate::state::PriceWindow;
use url::Url;

/// Builds search result URLs for a price window
#[derive(Debug, Clone)]
pub struct SearchPages {
    base: Url,
    min_price_param: String,
    max_price_param: String,
    page_param: String,
}

impl SearchPages {
    pub fn new(base: Url, min_price_param: &str, max_price_param: &str, page_param: &str) -> Self {
        Self {
            base,
            min_price_param: min_price_param.to_string(),
            max_price_param: max_price_param.to_string(),
            page_param: page_param.to_string(),
        }
    }

    pub fn from_config(site: &SiteConfig) -> Result<Self, url::ParseError> {
        Ok(Self::new(
            Url::parse(&site.search_url)?,
            &site.min_price_param,
            &site.max_price_param,
            &site.page_param,
        ))
    }

    /// The search URL every relative listing link is resolved against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of result page `page` (1-based) filtered to `window`
    ///
    /// # Examples
    ///
    /// ```
    /// use immo_harvest::state::PriceWindow;
    /// use immo_harvest::url::SearchPages;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://www.immobiliare.it/vendita-case/roma/").unwrap();
    /// let pages = SearchPages::new(base, "prezzoMinimo", "prezzoMassimo", "pag");
    /// assert_eq!(
    ///     pages.page_url(&PriceWindow::new(0, 20000), 2).as_str(),
    ///     "https://www.immobiliare.it/vendita-case/roma/?prezzoMinimo=0&prezzoMassimo=20000&pag=2"
    /// );
    /// ```
    pub fn page_url(&self, window: &PriceWindow, page: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(&self.min_price_param, &window.low().to_string())
            .append_pair(&self.max_price_param, &window.high().to_string())
            .append_pair(&self.page_param, &page.to_string());
        url
    }
}
