//! Definitions of Solidity interfaces called during deployment

use alloy::sol;

sol! {
    /// The event emitter's management surface, always bound to the proxy
    /// address rather than the raw implementation
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IVaultEventEmitter {
        function initialize(address admin, address devops) external;
        function pairVaultContract(address vault) external;
    }
}

sol! {
    /// The ERC4626 subset needed to validate the underlying vault's asset
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC4626 {
        function asset() external view returns (address);
    }
}

sol! {
    /// The strategy's management surface, driven during the post-deployment
    /// configuration sequence
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IStrategy {
        function setProfitMaxUnlockTime(uint256 profitMaxUnlockTime) external;
        function setPendingManagement(address management) external;
        function setKeeper(address keeper) external;
        function setPerformanceFeeRecipient(address feeRecipient) external;
        function setCollateralTokenParams(address token, uint256 minCollateralRatio) external;
        function setPendingGovernor(address governor) external;
    }
}

sol! {
    /// The vault factory; new vault addresses are read from the `NewVault`
    /// event in the deployment receipt
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IVaultFactory {
        event NewVault(address indexed vaultAddress, address indexed asset);

        function deploy_new_vault(
            address asset,
            string name,
            string symbol,
            address roleManager,
            uint256 profitMaxUnlockTime
        ) external returns (address);
    }
}

sol! {
    /// The accountant factory; new accountant addresses are read from the
    /// `NewAccountant` event in the deployment receipt
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IAccountantFactory {
        event NewAccountant(address newAccountant);

        function newAccountant() external returns (address);
    }
}

sol! {
    /// The vault's management surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IVault {
        function set_role(address account, uint256 role) external;
        function set_accountant(address accountant) external;
        function set_deposit_limit(uint256 depositLimit) external;
        function set_use_default_queue(bool useDefaultQueue) external;
        function transfer_role_manager(address roleManager) external;
    }
}

sol! {
    /// The accountant's management surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IAccountant {
        function updateDefaultConfig(
            uint256 defaultManagement,
            uint256 defaultPerformance,
            uint256 defaultRefund,
            uint256 defaultMaxFee,
            uint256 defaultMaxGain,
            uint256 defaultMaxLoss
        ) external;
        function addVault(address vault) external;
        function setFutureFeeManager(address feeManager) external;
        function setFeeRecipient(address feeRecipient) external;
    }
}
