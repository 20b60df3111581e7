use crate::error::DataError;
use crate::stations::catalog::Catalog;

/// The parameter codes requested on the next refresh.
///
/// Until narrowed with [`set`](ParameterRegistry::set) the registry mirrors every
/// parameter in the catalog. Changing it never triggers a fetch and never touches
/// snapshots that already exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterRegistry {
    subset: Option<Vec<String>>,
}

impl ParameterRegistry {
    /// Every parameter code the catalog knows, in catalog order.
    pub fn all(catalog: &Catalog) -> Vec<String> {
        catalog.parameter_codes()
    }

    /// Restricts requests to `subset`. Blank and repeated codes are dropped;
    /// an empty subset restores "all parameters".
    pub fn set<I, S>(&mut self, subset: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut codes: Vec<String> = Vec::new();
        for code in subset {
            let code = code.as_ref().trim();
            if !code.is_empty() && !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }
        self.subset = if codes.is_empty() { None } else { Some(codes) };
    }

    /// Same as [`set`](ParameterRegistry::set) for a comma-joined list such as `"TL,SO"`.
    pub fn set_from_str(&mut self, joined: &str) {
        self.set(joined.split(','));
    }

    pub fn reset(&mut self) {
        self.subset = None;
    }

    pub fn is_narrowed(&self) -> bool {
        self.subset.is_some()
    }

    /// The codes a refresh would request right now.
    ///
    /// Empty if the registry was never narrowed and the catalog is not loaded yet.
    pub fn current(&self, catalog: Option<&Catalog>) -> Vec<String> {
        match (&self.subset, catalog) {
            (Some(subset), _) => subset.clone(),
            (None, Some(catalog)) => Self::all(catalog),
            (None, None) => Vec::new(),
        }
    }

    /// Rejects codes the catalog does not offer.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), DataError> {
        let Some(subset) = &self.subset else {
            return Ok(());
        };
        match subset.iter().find(|code| catalog.parameter(code).is_none()) {
            Some(code) => Err(DataError::UnknownParameter {
                parameter: code.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_catalog;

    #[test]
    fn mirrors_catalog_until_narrowed() {
        let catalog = sample_catalog();
        let registry = ParameterRegistry::default();
        assert!(registry.current(None).is_empty());
        assert_eq!(
            registry.current(Some(&catalog)),
            vec!["DD", "FF", "P", "RF", "RR", "SO", "TL"]
        );
    }

    #[test]
    fn narrowing_before_catalog_is_kept() {
        let mut registry = ParameterRegistry::default();
        registry.set(["TL", "SO"]);
        assert_eq!(registry.current(None), vec!["TL", "SO"]);
        assert_eq!(registry.current(Some(&sample_catalog())), vec!["TL", "SO"]);
    }

    #[test]
    fn comma_joined_subset_is_trimmed_and_deduplicated() {
        let mut registry = ParameterRegistry::default();
        registry.set_from_str("TL, SO,,TL");
        assert_eq!(registry.current(None), vec!["TL", "SO"]);
    }

    #[test]
    fn empty_subset_restores_all() {
        let mut registry = ParameterRegistry::default();
        registry.set(["TL"]);
        registry.set(Vec::<String>::new());
        assert!(!registry.is_narrowed());
        registry.set(["P"]);
        registry.reset();
        assert!(!registry.is_narrowed());
    }

    #[test]
    fn unknown_codes_fail_validation() {
        let catalog = sample_catalog();
        let mut registry = ParameterRegistry::default();
        assert!(registry.validate(&catalog).is_ok());

        registry.set(["TL", "XX"]);
        let err = registry.validate(&catalog).unwrap_err();
        assert!(matches!(err, DataError::UnknownParameter { parameter } if parameter == "XX"));
    }
}
