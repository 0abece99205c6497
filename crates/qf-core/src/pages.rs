//! Multi-page overlay.
//!
//! Switching to multi-page mode wraps the current root as page 0. Going
//! back to a single page is only allowed while exactly one page exists;
//! pages are never merged or dropped implicitly.

use crate::error::PageError;
use crate::model::{Document, NavigationType, Page, PageConfig};

impl Document {
    /// Build a multi-page document from pages. An empty list yields one
    /// empty page.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        let pages = if pages.is_empty() {
            vec![Page::default()]
        } else {
            pages
        };
        Self {
            pages,
            active: 0,
            multi_page: true,
        }
    }

    /// Turn on multi-page mode. The existing root becomes page 0.
    /// No-op if already multi-page.
    pub fn enable_multi_page(&mut self) {
        if self.multi_page {
            return;
        }
        self.pages[0].config = PageConfig::default();
        self.multi_page = true;
        self.active = 0;
        log::info!("multi-page mode enabled");
    }

    /// Turn off multi-page mode. Only defined for a single page.
    pub fn disable_multi_page(&mut self) -> Result<(), PageError> {
        if !self.multi_page {
            return Ok(());
        }
        if self.pages.len() != 1 {
            return Err(PageError::MultiplePages(self.pages.len()));
        }
        // Single-page config is not persisted.
        self.pages[0].config = PageConfig::default();
        self.multi_page = false;
        self.active = 0;
        log::info!("single-page mode enabled");
        Ok(())
    }

    /// Append an empty page carrying page 0's config. Returns its index.
    pub fn add_page(&mut self) -> Result<usize, PageError> {
        if !self.multi_page {
            return Err(PageError::NotMultiPage);
        }
        let config = self.pages[0].config;
        self.pages.push(Page::new(config));
        Ok(self.pages.len() - 1)
    }

    /// Remove a page and everything on it. The last remaining page cannot
    /// be removed.
    pub fn remove_page(&mut self, index: usize) -> Result<Page, PageError> {
        self.check_page(index)?;
        if self.pages.len() == 1 {
            return Err(PageError::LastPage);
        }
        let page = self.pages.remove(index);
        if self.active >= self.pages.len() || self.active > index {
            self.active = self.active.saturating_sub(1);
        }
        Ok(page)
    }

    /// Make `index` the page that mutation and drop operations address.
    pub fn set_active_page(&mut self, index: usize) -> Result<(), PageError> {
        self.check_page(index)?;
        self.active = index;
        Ok(())
    }

    /// Navigation style, applied to every page.
    pub fn set_navigation_type(&mut self, navigation_type: NavigationType) -> Result<(), PageError> {
        if !self.multi_page {
            return Err(PageError::NotMultiPage);
        }
        for page in &mut self.pages {
            page.config.navigation_type = navigation_type;
        }
        Ok(())
    }

    /// Page-number display, applied to every page.
    pub fn set_show_page_numbers(&mut self, show: bool) -> Result<(), PageError> {
        if !self.multi_page {
            return Err(PageError::NotMultiPage);
        }
        for page in &mut self.pages {
            page.config.show_page_numbers = show;
        }
        Ok(())
    }

    /// Config shared by the form's navigation chrome (page 0's).
    pub fn page_config(&self) -> PageConfig {
        self.pages[0].config
    }

    fn check_page(&self, index: usize) -> Result<(), PageError> {
        if index >= self.pages.len() {
            return Err(PageError::OutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementId;
    use crate::model::{ElementKind, SeqPath};
    use crate::registry::construct;

    fn single_with(ids: &[&str]) -> Document {
        Document::from_elements(
            ids.iter()
                .map(|id| construct(ElementKind::TextField, ElementId::intern(id)))
                .collect(),
        )
    }

    #[test]
    fn enabling_wraps_root_as_first_page() {
        let mut doc = single_with(&["pg_a", "pg_b"]);
        doc.enable_multi_page();
        assert!(doc.is_multi_page());
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages()[0].elements().len(), 2);
        assert_eq!(doc.page_config(), PageConfig::default());
    }

    #[test]
    fn disabling_requires_single_page() {
        let mut doc = single_with(&["pg_c"]);
        doc.enable_multi_page();
        doc.add_page().unwrap();
        assert_eq!(doc.disable_multi_page(), Err(PageError::MultiplePages(2)));
        assert!(doc.is_multi_page());

        doc.remove_page(1).unwrap();
        doc.disable_multi_page().unwrap();
        assert!(!doc.is_multi_page());
        assert_eq!(doc.root().len(), 1);
    }

    #[test]
    fn add_page_requires_multi_page_mode() {
        let mut doc = Document::new();
        assert_eq!(doc.add_page(), Err(PageError::NotMultiPage));
    }

    #[test]
    fn page_config_requires_multi_page_mode() {
        let mut doc = Document::new();
        assert_eq!(
            doc.set_navigation_type(NavigationType::ProgressBar),
            Err(PageError::NotMultiPage)
        );
        assert_eq!(doc.set_show_page_numbers(false), Err(PageError::NotMultiPage));
        assert_eq!(doc.page_config(), PageConfig::default());
    }

    #[test]
    fn collapsing_to_single_page_resets_config() {
        let mut doc = single_with(&["pg_cfg"]);
        doc.enable_multi_page();
        doc.set_navigation_type(NavigationType::ProgressBar).unwrap();
        doc.set_show_page_numbers(false).unwrap();
        doc.disable_multi_page().unwrap();
        assert_eq!(doc.page_config(), PageConfig::default());

        let back = crate::parser::deserialize(&crate::emitter::serialize(&doc)).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn new_pages_copy_first_page_config() {
        let mut doc = Document::new();
        doc.enable_multi_page();
        doc.set_navigation_type(NavigationType::ProgressBar).unwrap();
        doc.set_show_page_numbers(false).unwrap();
        let idx = doc.add_page().unwrap();
        assert_eq!(
            doc.pages()[idx].config,
            PageConfig {
                navigation_type: NavigationType::ProgressBar,
                show_page_numbers: false,
            }
        );
    }

    #[test]
    fn operations_target_active_page() {
        let mut doc = Document::new();
        doc.enable_multi_page();
        doc.add_page().unwrap();
        doc.set_active_page(1).unwrap();
        doc.append(
            &doc.active_root(),
            construct(ElementKind::TitleField, ElementId::intern("pg_title")),
        )
        .unwrap();
        assert!(doc.pages()[0].elements().is_empty());
        assert_eq!(doc.root().len(), 1);
        assert_eq!(
            doc.locate(ElementId::intern("pg_title")).unwrap().seq,
            SeqPath::root(1)
        );
    }

    #[test]
    fn active_page_bounds() {
        let mut doc = Document::new();
        assert_eq!(
            doc.set_active_page(2),
            Err(PageError::OutOfRange { index: 2, count: 1 })
        );
        doc.enable_multi_page();
        doc.add_page().unwrap();
        doc.add_page().unwrap();
        doc.set_active_page(2).unwrap();
        doc.remove_page(2).unwrap();
        assert_eq!(doc.active_page(), 1);
        assert_eq!(doc.remove_page(0).map(|p| p.elements().len()), Ok(0));
        assert_eq!(doc.active_page(), 0);
        assert_eq!(doc.remove_page(0), Err(PageError::LastPage));
    }
}
