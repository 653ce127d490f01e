//! Unit Tests for the Instrument Registry and Ticker validation

use exchange_core::engine::{DividendClass, DividendSpec, Instrument, InstrumentRegistry, Symbol};
use exchange_core::ExchangeError;
use rust_decimal_macros::dec;

#[cfg(test)]
mod registry_tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn test_symbol_is_normalised() {
        assert_eq!(sym(" pop ").as_str(), "POP");
        assert_eq!(sym("tea"), sym("TEA"));
    }

    #[test]
    fn test_symbol_rejects_empty_and_spaces() {
        assert!(matches!(Symbol::new(""), Err(ExchangeError::Validation(_))));
        assert!(matches!(Symbol::new("   "), Err(ExchangeError::Validation(_))));
        assert!(matches!(Symbol::new("A B"), Err(ExchangeError::Validation(_))));
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = InstrumentRegistry::new();
        registry
            .register(Instrument::common("POP").unwrap(), &DividendSpec::common(dec!(8), dec!(100)))
            .unwrap();

        let ticker = registry.lookup(&sym("POP")).unwrap();
        assert_eq!(ticker.class(), DividendClass::Common);
        assert_eq!(ticker.last_dividend(), dec!(8));
        assert_eq!(ticker.par_value(), dec!(100));
        assert_eq!(ticker.fixed_dividend(), None);
        assert_eq!(ticker.ticker_price(), None);
    }

    #[test]
    fn test_duplicate_registration_rejected_and_first_kept() {
        let mut registry = InstrumentRegistry::new();
        registry
            .register(Instrument::common("POP").unwrap(), &DividendSpec::common(dec!(8), dec!(100)))
            .unwrap();

        let err = registry
            .register(Instrument::common("POP").unwrap(), &DividendSpec::common(dec!(99), dec!(1)))
            .unwrap_err();
        assert_eq!(err, ExchangeError::DuplicateInstrument(sym("POP")));

        let ticker = registry.lookup(&sym("POP")).unwrap();
        assert_eq!(ticker.last_dividend(), dec!(8));
        assert_eq!(ticker.par_value(), dec!(100));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_detected_across_classes() {
        let mut registry = InstrumentRegistry::new();
        registry
            .register(Instrument::common("GIN").unwrap(), &DividendSpec::common(dec!(8), dec!(100)))
            .unwrap();

        let err = registry
            .register(
                Instrument::preferred("GIN").unwrap(),
                &DividendSpec::preferred(dec!(8), dec!(0.02), dec!(100)),
            )
            .unwrap_err();
        assert!(matches!(err, ExchangeError::DuplicateInstrument(_)));
    }

    #[test]
    fn test_lookup_unknown_instrument() {
        let registry = InstrumentRegistry::new();
        assert_eq!(
            registry.lookup(&sym("XYZ")).unwrap_err(),
            ExchangeError::InstrumentNotFound(sym("XYZ"))
        );
    }

    #[test]
    fn test_ticker_validation() {
        let mut registry = InstrumentRegistry::new();

        let negative_dividend =
            registry.register(Instrument::common("A").unwrap(), &DividendSpec::common(dec!(-1), dec!(100)));
        assert!(matches!(negative_dividend, Err(ExchangeError::Validation(_))));

        let zero_par =
            registry.register(Instrument::common("B").unwrap(), &DividendSpec::common(dec!(1), dec!(0)));
        assert!(matches!(zero_par, Err(ExchangeError::Validation(_))));

        let preferred_without_fixed =
            registry.register(Instrument::preferred("C").unwrap(), &DividendSpec::common(dec!(1), dec!(100)));
        assert!(matches!(preferred_without_fixed, Err(ExchangeError::Validation(_))));

        let preferred_zero_fixed = registry.register(
            Instrument::preferred("D").unwrap(),
            &DividendSpec::preferred(dec!(1), dec!(0), dec!(100)),
        );
        assert!(matches!(preferred_zero_fixed, Err(ExchangeError::Validation(_))));

        let common_with_fixed = registry.register(
            Instrument::common("E").unwrap(),
            &DividendSpec::preferred(dec!(1), dec!(0.02), dec!(100)),
        );
        assert!(matches!(common_with_fixed, Err(ExchangeError::Validation(_))));

        // Nothing was registered by the failed attempts
        assert!(registry.is_empty());
    }

    #[test]
    fn test_zero_last_dividend_is_valid() {
        let mut registry = InstrumentRegistry::new();
        assert!(registry
            .register(Instrument::common("TEA").unwrap(), &DividendSpec::common(dec!(0), dec!(100)))
            .is_ok());
    }

    #[test]
    fn test_set_last_price() {
        let mut registry = InstrumentRegistry::new();
        registry
            .register(Instrument::common("POP").unwrap(), &DividendSpec::common(dec!(8), dec!(100)))
            .unwrap();

        registry.set_last_price(&sym("POP"), dec!(20)).unwrap();
        assert_eq!(registry.lookup(&sym("POP")).unwrap().ticker_price(), Some(dec!(20)));

        registry.set_last_price(&sym("POP"), dec!(21.5)).unwrap();
        assert_eq!(registry.lookup(&sym("POP")).unwrap().ticker_price(), Some(dec!(21.5)));
    }

    #[test]
    fn test_set_last_price_rejects_bad_input() {
        let mut registry = InstrumentRegistry::new();
        registry
            .register(Instrument::common("POP").unwrap(), &DividendSpec::common(dec!(8), dec!(100)))
            .unwrap();

        assert!(matches!(
            registry.set_last_price(&sym("POP"), dec!(0)),
            Err(ExchangeError::Validation(_))
        ));
        assert!(matches!(
            registry.set_last_price(&sym("POP"), dec!(-3)),
            Err(ExchangeError::Validation(_))
        ));
        assert!(matches!(
            registry.set_last_price(&sym("XYZ"), dec!(3)),
            Err(ExchangeError::InstrumentNotFound(_))
        ));
        assert_eq!(registry.lookup(&sym("POP")).unwrap().ticker_price(), None);
    }

    #[test]
    fn test_instruments_sorted_by_symbol() {
        let mut registry = InstrumentRegistry::new();
        for s in ["POP", "ALE", "TEA"] {
            registry
                .register(Instrument::common(s).unwrap(), &DividendSpec::common(dec!(1), dec!(100)))
                .unwrap();
        }

        let symbols: Vec<String> = registry
            .instruments()
            .into_iter()
            .map(|i| i.symbol.to_string())
            .collect();
        assert_eq!(symbols, vec!["ALE", "POP", "TEA"]);
    }
}
