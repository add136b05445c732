//! Balancer Constants
//!
//! Contract interfaces and the BPool parameter bounds enforced on-chain.

use alloy::sol;

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    interface IWETH {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
    }

    interface IProxyRegistry {
        function proxies(address owner) external view returns (address);
        function build() external returns (address proxy);
    }

    interface IDSProxy {
        function execute(address target, bytes data) external payable returns (bytes32 response);
    }

    interface IBActions {
        function create(
            address factory,
            address[] tokens,
            uint256[] balances,
            uint256[] weights,
            uint256 swapFee,
            bool finalize
        ) external returns (address pool);
    }

    interface IBPool {
        function balanceOf(address owner) external view returns (uint256);
        function getCurrentTokens() external view returns (address[] tokens);
        function exitPool(uint256 poolAmountIn, uint256[] minAmountsOut) external;
    }

    interface IExchangeProxy {
        struct Swap {
            address pool;
            address tokenIn;
            address tokenOut;
            uint256 swapAmount;
            uint256 limitReturnAmount;
            uint256 maxPrice;
        }

        function multihopBatchSwapExactIn(
            Swap[][] swapSequences,
            address tokenIn,
            address tokenOut,
            uint256 totalAmountIn,
            uint256 minTotalAmountOut
        ) external payable returns (uint256 totalAmountOut);

        function multihopBatchSwapExactOut(
            Swap[][] swapSequences,
            address tokenIn,
            address tokenOut,
            uint256 maxTotalAmountIn
        ) external payable returns (uint256 totalAmountIn);
    }
}

/// BPool parameter bounds (BConst)
pub mod bounds {
    use alloy::primitives::{uint, U256};

    pub const MIN_BOUND_TOKENS: usize = 2;
    pub const MAX_BOUND_TOKENS: usize = 8;

    /// 0.0001% in 18-decimal fixed point
    pub const MIN_FEE: U256 = uint!(1_000_000_000_000_U256);
    /// 10% in 18-decimal fixed point
    pub const MAX_FEE: U256 = uint!(100_000_000_000_000_000_U256);

    pub const MIN_WEIGHT: U256 = uint!(1_000_000_000_000_000_000_U256);
    pub const MAX_WEIGHT: U256 = uint!(50_000_000_000_000_000_000_U256);
    pub const MAX_TOTAL_WEIGHT: U256 = uint!(50_000_000_000_000_000_000_U256);

    pub const MIN_BALANCE: U256 = uint!(1_000_000_U256);
}

/// Readable explanation for a BPool / ExchangeProxy revert string
pub fn describe_revert(reason: &str) -> Option<&'static str> {
    let start = reason.find("ERR_")?;
    let code = reason[start..]
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()?;

    let description = match code {
        "ERR_LIMIT_OUT" => "Output fell below the slippage limit",
        "ERR_LIMIT_IN" => "Input exceeded the slippage limit",
        "ERR_LIMIT_PRICE" => "Pool price moved past the allowed limit",
        "ERR_BAD_LIMIT_PRICE" => "Pool spot price is already beyond the limit",
        "ERR_MAX_IN_RATIO" => "Trade too large for pool liquidity (input ratio)",
        "ERR_MAX_OUT_RATIO" => "Trade too large for pool liquidity (output ratio)",
        "ERR_MATH_APPROX" => "Pool math approximation failed",
        "ERR_NOT_BOUND" => "Token is not bound to the pool",
        "ERR_IS_BOUND" => "Token is already bound to the pool",
        "ERR_SWAP_NOT_PUBLIC" => "Swapping is disabled on this pool",
        "ERR_NOT_FINALIZED" => "Pool is not finalized",
        "ERR_IS_FINALIZED" => "Pool is already finalized",
        "ERR_MIN_TOKENS" => "Pool needs at least two tokens",
        "ERR_MAX_TOKENS" => "Pool cannot hold more than eight tokens",
        "ERR_MIN_WEIGHT" => "Token weight below minimum",
        "ERR_MAX_WEIGHT" => "Token weight above maximum",
        "ERR_MAX_TOTAL_WEIGHT" => "Total pool weight above maximum",
        "ERR_MIN_BALANCE" => "Token balance below minimum",
        "ERR_MIN_FEE" => "Swap fee below minimum",
        "ERR_MAX_FEE" => "Swap fee above maximum",
        "ERR_INSUFFICIENT_BAL" => "Insufficient balance",
        "ERR_ERC20_FALSE" => "Token transfer returned false",
        "ERR_NOT_CONTROLLER" => "Caller is not the pool controller",
        "ERR_REENTRY" => "Reentrant call",
        _ => return None,
    };
    Some(description)
}
