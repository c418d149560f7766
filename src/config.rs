// Configuration for the offers service and presenter

// Query configuration applied by the offers service
#[derive(Debug, Clone)]
pub struct OffersConfig {
    // Restrict results to hotels flagged for promotion
    pub only_promo_hotels: bool,
    // Skip offers whose stay window already ended
    pub only_actual: bool,
}

impl Default for OffersConfig {
    fn default() -> Self {
        Self {
            only_promo_hotels: false,
            only_actual: true,
        }
    }
}

// Presenter configuration
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    // Render `details: null` for unrecognized types instead of failing
    pub omit_unknown_details: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            omit_unknown_details: true,
        }
    }
}
