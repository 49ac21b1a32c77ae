//! Contract ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the token and
//! the NTT manager. Only the calls the transfer flow makes are declared.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    /// ERC20 subset read and written by the transfer flow
    #[sol(rpc)]
    contract ERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    /// Wormhole NTT manager (source side of a transfer)
    #[sol(rpc)]
    contract NttManager {
        /// Whether the proxy implementation has been initialized
        function isInitialized() external view returns (bool);

        /// Start a cross-chain transfer
        ///
        /// `msg.value` pays the transceiver delivery fee.
        function transfer(
            uint256 amount,
            uint16 recipientChain,
            bytes32 recipient,
            bytes32 refundAddress,
            bool shouldQueue,
            bytes transceiverInstructions
        ) external payable returns (uint64 msgSequence);

        /// Delivery price per enabled transceiver and the total
        function quoteDeliveryPrice(
            uint16 recipientChain,
            bytes transceiverInstructions
        ) external view returns (uint256[] memory, uint256);
    }
}
