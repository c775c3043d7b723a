//! ABI bindings of the bridge contracts this service reads from or builds calls for

use alloy::{
    primitives::{address, Address},
    sol,
};

/// OVM gas price oracle predeploy on Optimism
pub const OPTIMISM_GAS_PRICE_ORACLE: Address = address!("420000000000000000000000000000000000000F");

/// Saddle pool index of the canonical token
pub const CANONICAL_TOKEN_INDEX: u8 = 0;

/// Saddle pool index of the hToken
pub const HOP_BRIDGE_TOKEN_INDEX: u8 = 1;

sol! {
    /// Accounting shared by the L1 and L2 bridges
    interface IBridge {
        function getCredit(address bonder) external view returns (uint256 credit);
        function getDebitAndAdditionalDebit(address bonder) external view returns (uint256 debit);
        function bondWithdrawal(address recipient, uint256 amount, bytes32 transferNonce, uint256 bonderFee) external;
    }

    interface IL1Bridge {
        function sendToL2(
            uint256 chainId,
            address recipient,
            uint256 amount,
            uint256 amountOutMin,
            uint256 deadline,
            address relayer,
            uint256 relayerFee
        ) external payable;
        function isChainIdPaused(uint256 chainId) external view returns (bool paused);
        function challengePeriod() external view returns (uint256 period);
        function TIME_SLOT_SIZE() external view returns (uint256 size);
        function getTimeSlot(uint256 time) external pure returns (uint256 slot);
        function timeSlotToAmountBonded(uint256 timeSlot, address bonder) external view returns (uint256 amount);
    }

    interface IL2Bridge {
        function send(
            uint256 chainId,
            address recipient,
            uint256 amount,
            uint256 bonderFee,
            uint256 amountOutMin,
            uint256 deadline
        ) external payable;
        function bondWithdrawalAndDistribute(
            address recipient,
            uint256 amount,
            bytes32 transferNonce,
            uint256 bonderFee,
            uint256 amountOutMin,
            uint256 deadline
        ) external;
        function minBonderFeeAbsolute() external view returns (uint256 fee);
        function pendingAmountForChainId(uint256 chainId) external view returns (uint256 amount);
    }

    interface IL2AmmWrapper {
        function swapAndSend(
            uint256 chainId,
            address recipient,
            uint256 amount,
            uint256 bonderFee,
            uint256 amountOutMin,
            uint256 deadline,
            uint256 destinationAmountOutMin,
            uint256 destinationDeadline
        ) external payable;
    }

    interface ISaddleSwap {
        function calculateSwap(uint8 tokenIndexFrom, uint8 tokenIndexTo, uint256 dx) external view returns (uint256 amount);
        function getVirtualPrice() external view returns (uint256 price);
        function getTokenBalance(uint8 index) external view returns (uint256 balance);
    }

    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
        function allowance(address owner, address spender) external view returns (uint256 remaining);
        function approve(address spender, uint256 amount) external returns (bool success);
    }

    interface IGasPriceOracle {
        function getL1Fee(bytes memory data) external view returns (uint256 fee);
    }
}
