//! Contract bindings for the delegation and market contracts.

use alloy_sol_types::sol;

sol! {
    #[sol(rpc)]
    contract RebalancerDelegation {
        error NotOperator();
        error AutoRebalanceNotEnabled();
        error NothingToRebalance();

        function userConfigs(address user)
            external
            view
            returns (bool enabled, uint8 riskProfile, uint256 depositedAmount);

        function rebalance(address user) external;
    }
}

sol! {
    #[sol(rpc)]
    contract PredictionMarket {
        error NotOperator();
        error MarketNotActive();
        error MarketAlreadyResolved();

        function getMarketStatus(uint256 marketId)
            external
            view
            returns (bool active, bool resolved, uint64 endTime, uint256 vaultBalance);

        function rebalanceMarketVault(uint256 marketId) external;
    }
}
