//! Parsing and validation of the deployment configuration
//!
//! All validation happens here, before any network call: a pipeline either
//! starts from a fully consistent configuration or not at all

use std::str::FromStr;

use alloy::primitives::{Address, U256};

use crate::{
    cli::{DeployStrategyArgs, DeployVaultArgs},
    errors::ScriptError,
};

/// The validated configuration of the strategy deployment pipeline
///
/// Immutable once resolved; threaded as a parameter through every
/// pipeline step
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// The strategy's underlying asset
    pub asset: Address,
    /// The yield vault the strategy wraps
    pub underlying_vault: Address,
    /// The rate adapter consulted when discounting collateral
    pub rate_adapter: Address,
    /// The controller contract
    pub controller: Address,
    /// The rate markup applied by the strategy
    pub markup: U256,
    /// The time-to-maturity threshold
    pub maturity_threshold: U256,
    /// The per-token concentration limit
    pub concentration_limit: U256,
    /// The required reserve ratio
    pub reserve_ratio: U256,
    /// The profit unlocking duration, in seconds
    pub profit_max_unlock_time: U256,
    /// The event emitter admin
    pub admin: Address,
    /// The event emitter devops identity
    pub devops: Address,
    /// The identity given pending management of the strategy
    pub management: Address,
    /// The keeper identity
    pub keeper: Address,
    /// The performance fee recipient
    pub fee_recipient: Address,
    /// The identity given pending governorship of the strategy
    pub governor: Address,
    /// The strategy share token's name
    pub name: String,
    /// The strategy share token's symbol
    pub symbol: String,
    /// The collateral token addresses
    pub collateral_tokens: Vec<Address>,
    /// The minimum collateral ratios, parallel to `collateral_tokens`
    pub min_collateral_ratios: Vec<U256>,
    /// A pre-existing event emitter implementation to reuse, skipping the
    /// implementation deployment
    pub event_emitter_impl: Option<Address>,
}

impl StrategyConfig {
    /// Validate the raw arguments into a consistent configuration
    pub fn resolve(args: &DeployStrategyArgs) -> Result<Self, ScriptError> {
        let collateral_tokens = parse_address_list(&args.collateral_tokens)?;
        let min_collateral_ratios = parse_uint_list(&args.min_collateral_ratios)?;
        if collateral_tokens.len() != min_collateral_ratios.len() {
            return Err(ScriptError::Configuration(format!(
                "COLLATERAL_TOKEN_ADDRESSES and MIN_COLLATERAL_RATIOS must have \
                 the same number of entries, got {} and {}",
                collateral_tokens.len(),
                min_collateral_ratios.len(),
            )));
        }

        let (name, symbol) = parse_name_symbol(&args.strategy_name)?;

        Ok(Self {
            asset: parse_address(&args.asset)?,
            underlying_vault: parse_address(&args.underlying_vault)?,
            rate_adapter: parse_address(&args.rate_adapter)?,
            controller: parse_address(&args.controller)?,
            markup: parse_uint(&args.markup)?,
            maturity_threshold: parse_uint(&args.maturity_threshold)?,
            concentration_limit: parse_uint(&args.concentration_limit)?,
            reserve_ratio: parse_uint(&args.reserve_ratio)?,
            profit_max_unlock_time: parse_uint(&args.profit_max_unlock_time)?,
            admin: parse_address(&args.admin)?,
            devops: parse_address(&args.devops)?,
            management: parse_address(&args.management)?,
            keeper: parse_address(&args.keeper)?,
            fee_recipient: parse_address(&args.fee_recipient)?,
            governor: parse_address(&args.governor)?,
            name,
            symbol,
            collateral_tokens,
            min_collateral_ratios,
            event_emitter_impl: args
                .event_emitter_impl
                .as_deref()
                .map(parse_address)
                .transpose()?,
        })
    }
}

/// The validated configuration of the vault deployment pipeline
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// The vault factory
    pub vault_factory: Address,
    /// The accountant factory
    pub accountant_factory: Address,
    /// The governance factory receiving the role manager authority and the
    /// accountant's future fee management
    pub governance_factory: Address,
    /// The vault's underlying asset
    pub asset: Address,
    /// The vault share token's name
    pub name: String,
    /// The vault share token's symbol
    pub symbol: String,
    /// The profit unlocking duration, in seconds
    pub profit_max_unlock_time: U256,
    /// The keeper identity
    pub keeper: Address,
    /// The identity granted the strategy-adder role
    pub strategy_adder: Address,
    /// The vault deposit limit
    pub deposit_limit: U256,
    /// The accountant's default performance fee
    pub default_performance_fee: U256,
    /// The accountant's default maximum fee
    pub default_max_fee: U256,
    /// The accountant's default maximum gain
    pub default_max_gain: U256,
    /// The accountant's default maximum loss
    pub default_max_loss: U256,
    /// The accountant's fee recipient
    pub fee_recipient: Address,
}

impl VaultConfig {
    /// Validate the raw arguments into a consistent configuration
    pub fn resolve(args: &DeployVaultArgs) -> Result<Self, ScriptError> {
        Ok(Self {
            vault_factory: parse_address(&args.vault_factory)?,
            accountant_factory: parse_address(&args.accountant_factory)?,
            governance_factory: parse_address(&args.governance_factory)?,
            asset: parse_address(&args.asset)?,
            name: parse_nonempty(&args.vault_name, "VAULT_NAME")?,
            symbol: parse_nonempty(&args.vault_symbol, "VAULT_SYMBOL")?,
            profit_max_unlock_time: parse_uint(&args.profit_max_unlock_time)?,
            keeper: parse_address(&args.keeper)?,
            strategy_adder: parse_address(&args.strategy_adder)?,
            deposit_limit: parse_uint(&args.deposit_limit)?,
            default_performance_fee: parse_uint(&args.default_performance_fee)?,
            default_max_fee: parse_uint(&args.default_max_fee)?,
            default_max_gain: parse_uint(&args.default_max_gain)?,
            default_max_loss: parse_uint(&args.default_max_loss)?,
            fee_recipient: parse_address(&args.fee_recipient)?,
        })
    }
}

/// Parse a single address, trimming surrounding whitespace
pub fn parse_address(input: &str) -> Result<Address, ScriptError> {
    let trimmed = input.trim();
    Address::from_str(trimmed)
        .map_err(|_| ScriptError::Configuration(format!("invalid address: {trimmed}")))
}

/// Parse a single non-negative integer
///
/// The token must round-trip through its canonical decimal representation:
/// anything a re-render would not reproduce exactly (scientific notation,
/// leading zeros, signs, trailing characters) is rejected rather than
/// silently normalized
pub fn parse_uint(input: &str) -> Result<U256, ScriptError> {
    let trimmed = input.trim();
    let parsed = U256::from_str_radix(trimmed, 10)
        .map_err(|_| ScriptError::Configuration(format!("invalid number: {trimmed}")))?;
    if parsed.to_string() != trimmed {
        return Err(ScriptError::Configuration(format!(
            "invalid number: {trimmed}"
        )));
    }

    Ok(parsed)
}

/// Parse a comma-separated address list, trimming each element
///
/// Empty input yields an empty list; a single invalid element rejects the
/// whole list
pub fn parse_address_list(input: &str) -> Result<Vec<Address>, ScriptError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input.split(',').map(parse_address).collect()
}

/// Parse a comma-separated list of non-negative integers, trimming each
/// element; all-or-nothing like [`parse_address_list`]
pub fn parse_uint_list(input: &str) -> Result<Vec<U256>, ScriptError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input.split(',').map(parse_uint).collect()
}

/// Split a `"name,symbol"` pair into its two non-empty parts
pub fn parse_name_symbol(input: &str) -> Result<(String, String), ScriptError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [name, symbol] if !name.is_empty() && !symbol.is_empty() => {
            Ok((name.to_string(), symbol.to_string()))
        }
        _ => Err(ScriptError::Configuration(format!(
            "expected a \"name,symbol\" pair, got: {input}"
        ))),
    }
}

/// Require a non-empty trimmed value for the named key
fn parse_nonempty(input: &str, key: &str) -> Result<String, ScriptError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScriptError::Configuration(format!("{key} must not be empty")));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_docs_in_private_items)]

    use super::*;

    /// A well-formed address used throughout the tests
    const ADDR_A: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    /// A second well-formed address
    const ADDR_B: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

    #[test]
    fn test_address_list_trimming_is_invisible() {
        let spaced = parse_address_list(&format!(" {ADDR_A} , {ADDR_B} ")).unwrap();
        let tight = parse_address_list(&format!("{ADDR_A},{ADDR_B}")).unwrap();
        assert_eq!(spaced, tight);
        assert_eq!(spaced.len(), 2);
    }

    #[test]
    fn test_address_list_empty_input() {
        assert_eq!(parse_address_list("").unwrap(), Vec::<Address>::new());
        assert_eq!(parse_address_list("   ").unwrap(), Vec::<Address>::new());
    }

    #[test]
    fn test_address_list_all_or_nothing() {
        let input = format!("{ADDR_A},nonsense,{ADDR_B}");
        assert!(matches!(
            parse_address_list(&input),
            Err(ScriptError::Configuration(_))
        ));
    }

    #[test]
    fn test_uint_accepts_plain_integers() {
        assert_eq!(parse_uint("0").unwrap(), U256::ZERO);
        assert_eq!(parse_uint(" 1000 ").unwrap(), U256::from(1000u64));
    }

    #[test]
    fn test_uint_rejects_non_canonical_tokens() {
        for bad in ["1e3", "01", "+5", "-5", "1.0", "0x10", "1000wei", ""] {
            assert!(
                matches!(parse_uint(bad), Err(ScriptError::Configuration(_))),
                "expected rejection of {bad:?}",
            );
        }
    }

    #[test]
    fn test_uint_list_all_or_nothing() {
        assert!(parse_uint_list("1,2,three").is_err());
        assert_eq!(
            parse_uint_list(" 1 , 2 ").unwrap(),
            vec![U256::from(1u64), U256::from(2u64)],
        );
    }

    #[test]
    fn test_name_symbol_pair() {
        assert_eq!(
            parse_name_symbol("Wrapped Yield, wYLD").unwrap(),
            ("Wrapped Yield".to_string(), "wYLD".to_string()),
        );
        for bad in ["NoSymbol", "a,b,c", ",SYM", "Name,"] {
            assert!(parse_name_symbol(bad).is_err(), "expected rejection of {bad:?}");
        }
    }

    /// Build a fully-populated set of strategy args for resolution tests
    fn strategy_args() -> DeployStrategyArgs {
        DeployStrategyArgs {
            artifacts_root: ".".to_string(),
            asset: ADDR_A.to_string(),
            underlying_vault: ADDR_B.to_string(),
            rate_adapter: ADDR_A.to_string(),
            controller: ADDR_B.to_string(),
            markup: "5".to_string(),
            maturity_threshold: "3600".to_string(),
            concentration_limit: "100000".to_string(),
            reserve_ratio: "2000".to_string(),
            profit_max_unlock_time: "86400".to_string(),
            admin: ADDR_A.to_string(),
            devops: ADDR_B.to_string(),
            management: ADDR_A.to_string(),
            keeper: ADDR_B.to_string(),
            fee_recipient: ADDR_A.to_string(),
            governor: ADDR_B.to_string(),
            strategy_name: "Wrapped Yield,wYLD".to_string(),
            collateral_tokens: String::new(),
            min_collateral_ratios: String::new(),
            event_emitter_impl: None,
            verifier_url: None,
            verifier_api_key: None,
        }
    }

    #[test]
    fn test_resolve_strategy_config() {
        let config = StrategyConfig::resolve(&strategy_args()).unwrap();
        assert_eq!(config.name, "Wrapped Yield");
        assert_eq!(config.symbol, "wYLD");
        assert!(config.collateral_tokens.is_empty());
        assert!(config.event_emitter_impl.is_none());
    }

    #[test]
    fn test_resolve_rejects_unequal_collateral_lists() {
        let mut args = strategy_args();
        args.collateral_tokens = format!("{ADDR_A},{ADDR_B}");
        args.min_collateral_ratios = "100".to_string();

        let err = StrategyConfig::resolve(&args).unwrap_err();
        match err {
            ScriptError::Configuration(msg) => {
                assert!(msg.contains("COLLATERAL_TOKEN_ADDRESSES"));
                assert!(msg.contains("MIN_COLLATERAL_RATIOS"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_accepts_matched_collateral_lists() {
        let mut args = strategy_args();
        args.collateral_tokens = format!("{ADDR_A}, {ADDR_B}");
        args.min_collateral_ratios = "100, 200".to_string();

        let config = StrategyConfig::resolve(&args).unwrap();
        assert_eq!(config.collateral_tokens.len(), 2);
        assert_eq!(config.min_collateral_ratios.len(), 2);
    }

    #[test]
    fn test_resolve_parses_address_case_insensitively() {
        let mut args = strategy_args();
        args.asset = ADDR_A.to_lowercase();
        let config = StrategyConfig::resolve(&args).unwrap();
        assert_eq!(config.asset, Address::from_str(ADDR_A).unwrap());
    }
}
