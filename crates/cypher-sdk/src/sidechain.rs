//! Asset bridge between a main chain and a side chain
//!
//! Deposits and mappings are sent to the main chain gateway, withdrawals to
//! the side chain gateway (or the mapped token contract on the side chain).
//! Side chain transactions are signed over `sha256(txid || side_chain_id)`.

use cypher_crypto::sha256;
use cypher_primitives::{Address, H256, U256};
use cypher_types::Transaction;
use tracing::debug;

use crate::abi::Token;
use crate::address::parse_arg;
use crate::client::CypherWeb;
use crate::transaction_builder::TriggerOptions;
use crate::tx_builder::MAX_FEE_LIMIT;
use crate::SdkError;

/// Options shared by bridge operations
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeOptions {
    /// Account permission the signatures are checked against
    pub permission_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chain {
    Main,
    Side,
}

/// Token standard of a bridged contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Standard {
    Trc20,
    Trc721,
}

impl Standard {
    fn suffix(self) -> &'static str {
        match self {
            Standard::Trc20 => "TRC20",
            Standard::Trc721 => "TRC721",
        }
    }
}

/// Main and side chain clients plus the gateways between them
pub struct SideChain {
    main: CypherWeb,
    side: CypherWeb,
    main_gateway: Address,
    side_gateway: Address,
    side_chain_id: Vec<u8>,
}

/// Digest signed for side chain transactions
pub fn side_chain_digest(txid: &H256, side_chain_id: &[u8]) -> H256 {
    let mut data = txid.as_bytes().to_vec();
    data.extend_from_slice(side_chain_id);
    sha256(&data)
}

fn check_fee_limit(fee_limit: i64) -> Result<(), SdkError> {
    if fee_limit <= 0 || fee_limit > MAX_FEE_LIMIT {
        return Err(SdkError::invalid_input("Invalid feeLimit provided"));
    }
    Ok(())
}

fn check_amount(value: i64, name: &str) -> Result<(), SdkError> {
    if value < 0 {
        return Err(SdkError::invalid_input(format!("Invalid {} provided", name)));
    }
    Ok(())
}

fn uint(value: i64) -> Token {
    Token::Uint(U256::from(value as u64))
}

impl SideChain {
    /// Bridge between `main` and `side`
    ///
    /// Gateways are hex or base58 addresses; `side_chain_id` is hex.
    pub fn new(
        main: CypherWeb,
        side: CypherWeb,
        main_gateway: &str,
        side_gateway: &str,
        side_chain_id: &str,
    ) -> Result<Self, SdkError> {
        let main_gateway = parse_arg(main_gateway, "Invalid main gateway address provided")?;
        let side_gateway = parse_arg(side_gateway, "Invalid side gateway address provided")?;
        let side_chain_id = hex::decode(side_chain_id.strip_prefix("0x").unwrap_or(side_chain_id))
            .map_err(|_| SdkError::invalid_input("Invalid side chain id provided"))?;
        Ok(Self { main, side, main_gateway, side_gateway, side_chain_id })
    }

    /// Main chain client
    pub fn main_chain(&self) -> &CypherWeb {
        &self.main
    }

    /// Side chain client
    pub fn side_chain(&self) -> &CypherWeb {
        &self.side
    }

    /// Side chain id bytes
    pub fn side_chain_id(&self) -> &[u8] {
        &self.side_chain_id
    }

    fn client(&self, chain: Chain) -> &CypherWeb {
        match chain {
            Chain::Main => &self.main,
            Chain::Side => &self.side,
        }
    }

    /// Append a side chain signature with `key`, or the side chain's default key
    pub fn sign(&self, tx: &mut Transaction, key: Option<&str>) -> Result<(), SdkError> {
        let wallet = self.side.signer(key)?;
        let signature = wallet.sign_hash(&side_chain_digest(&tx.txid(), &self.side_chain_id))?;
        tx.push_signature(signature);
        Ok(())
    }

    async fn trigger(
        &self,
        chain: Chain,
        contract: &Address,
        function: &str,
        params: &[Token],
        options: TriggerOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        let client = self.client(chain);
        let signer = client.signer(key)?;
        let issuer = signer.address().to_hex();

        let mut tx = client
            .transaction_builder()
            .trigger_smart_contract(&contract.to_hex(), function, params, &options, Some(&issuer))
            .await?;
        match chain {
            Chain::Main => signer.sign_transaction(&mut tx)?,
            Chain::Side => self.sign(&mut tx, key)?,
        }
        debug!(?chain, %contract, function, txid = %tx.txid().to_hex(), "bridge transaction");
        Ok(client.send_raw_transaction(&tx).await?.txid)
    }

    fn options(fee_limit: i64, call_value: i64, options: &BridgeOptions) -> TriggerOptions {
        TriggerOptions {
            fee_limit: Some(fee_limit),
            call_value,
            permission_id: options.permission_id,
            ..Default::default()
        }
    }

    /// Deposit native coin into the side chain
    pub async fn deposit_cyp(
        &self,
        call_value: i64,
        deposit_fee: i64,
        fee_limit: i64,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        check_amount(call_value, "callValue")?;
        check_amount(deposit_fee, "depositFee")?;
        check_fee_limit(fee_limit)?;
        let opts = Self::options(fee_limit, call_value + deposit_fee, options);
        self.trigger(Chain::Main, &self.main_gateway, "depositTRX()", &[], opts, key).await
    }

    /// Deposit an issued token into the side chain
    pub async fn deposit_trc10(
        &self,
        token_id: i64,
        token_value: i64,
        deposit_fee: i64,
        fee_limit: i64,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        if token_id <= 0 {
            return Err(SdkError::invalid_input("Invalid tokenId provided"));
        }
        check_amount(token_value, "tokenValue")?;
        check_amount(deposit_fee, "depositFee")?;
        check_fee_limit(fee_limit)?;
        let opts = TriggerOptions {
            token_id,
            token_value,
            ..Self::options(fee_limit, deposit_fee, options)
        };
        self.trigger(
            Chain::Main,
            &self.main_gateway,
            "depositTRC10(uint64,uint64)",
            &[uint(token_id), uint(token_value)],
            opts,
            key,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn deposit_token(
        &self,
        standard: Standard,
        num: i64,
        deposit_fee: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        check_amount(num, "num")?;
        check_amount(deposit_fee, "depositFee")?;
        check_fee_limit(fee_limit)?;
        let contract = parse_arg(contract_address, "Invalid contractAddress address provided")?;
        let function = format!("deposit{}(address,uint256)", standard.suffix());
        self.trigger(
            Chain::Main,
            &self.main_gateway,
            &function,
            &[Token::Address(contract), uint(num)],
            Self::options(fee_limit, deposit_fee, options),
            key,
        )
        .await
    }

    /// Deposit a TRC20 amount into the side chain
    pub async fn deposit_trc20(
        &self,
        num: i64,
        deposit_fee: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.deposit_token(Standard::Trc20, num, deposit_fee, fee_limit, contract_address, options, key)
            .await
    }

    /// Deposit a TRC721 token id into the side chain
    pub async fn deposit_trc721(
        &self,
        id: i64,
        deposit_fee: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.deposit_token(Standard::Trc721, id, deposit_fee, fee_limit, contract_address, options, key)
            .await
    }

    async fn approve(
        &self,
        num: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        check_amount(num, "num")?;
        check_fee_limit(fee_limit)?;
        let contract = parse_arg(contract_address, "Invalid contractAddress address provided")?;
        self.trigger(
            Chain::Main,
            &contract,
            "approve(address,uint256)",
            &[Token::Address(self.main_gateway), uint(num)],
            Self::options(fee_limit, 0, options),
            key,
        )
        .await
    }

    /// Let the main gateway move `num` TRC20 units before a deposit
    pub async fn approve_trc20(
        &self,
        num: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.approve(num, fee_limit, contract_address, options, key).await
    }

    /// Let the main gateway move TRC721 token `id` before a deposit
    pub async fn approve_trc721(
        &self,
        id: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.approve(id, fee_limit, contract_address, options, key).await
    }

    async fn mapping(
        &self,
        standard: Standard,
        cyp_hash: &str,
        mapping_fee: i64,
        fee_limit: i64,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        let hash = cyp_hash.strip_prefix("0x").unwrap_or(cyp_hash);
        if hash.len() != 64 || !crate::utils::is_hex(hash) {
            return Err(SdkError::invalid_input("Invalid cypHash provided"));
        }
        check_amount(mapping_fee, "mappingFee")?;
        check_fee_limit(fee_limit)?;
        let function = format!("mapping{}(bytes)", standard.suffix());
        self.trigger(
            Chain::Main,
            &self.main_gateway,
            &function,
            &[Token::Bytes(hex::decode(hash)?)],
            Self::options(fee_limit, mapping_fee, options),
            key,
        )
        .await
    }

    /// Map a TRC20 contract, given its deployment transaction hash
    pub async fn mapping_trc20(
        &self,
        cyp_hash: &str,
        mapping_fee: i64,
        fee_limit: i64,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.mapping(Standard::Trc20, cyp_hash, mapping_fee, fee_limit, options, key).await
    }

    /// Map a TRC721 contract, given its deployment transaction hash
    pub async fn mapping_trc721(
        &self,
        cyp_hash: &str,
        mapping_fee: i64,
        fee_limit: i64,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.mapping(Standard::Trc721, cyp_hash, mapping_fee, fee_limit, options, key).await
    }

    /// Withdraw native coin back to the main chain
    pub async fn withdraw_cyp(
        &self,
        call_value: i64,
        withdraw_fee: i64,
        fee_limit: i64,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        check_amount(call_value, "callValue")?;
        check_amount(withdraw_fee, "withdrawFee")?;
        check_fee_limit(fee_limit)?;
        let opts = Self::options(fee_limit, call_value + withdraw_fee, options);
        self.trigger(Chain::Side, &self.side_gateway, "withdrawTRX()", &[], opts, key).await
    }

    /// Withdraw an issued token back to the main chain
    pub async fn withdraw_trc10(
        &self,
        token_id: i64,
        token_value: i64,
        withdraw_fee: i64,
        fee_limit: i64,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        if token_id <= 0 {
            return Err(SdkError::invalid_input("Invalid tokenId provided"));
        }
        check_amount(token_value, "tokenValue")?;
        check_amount(withdraw_fee, "withdrawFee")?;
        check_fee_limit(fee_limit)?;
        let opts = TriggerOptions {
            token_id,
            token_value,
            ..Self::options(fee_limit, withdraw_fee, options)
        };
        self.trigger(
            Chain::Side,
            &self.side_gateway,
            "withdrawTRC10(uint256,uint256)",
            &[uint(token_id), uint(token_value)],
            opts,
            key,
        )
        .await
    }

    async fn withdraw_token(
        &self,
        num: i64,
        withdraw_fee: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        check_amount(num, "numOrId")?;
        check_amount(withdraw_fee, "withdrawFee")?;
        check_fee_limit(fee_limit)?;
        let contract = parse_arg(contract_address, "Invalid contractAddress address provided")?;
        self.trigger(
            Chain::Side,
            &contract,
            "withdrawal(uint256)",
            &[uint(num)],
            Self::options(fee_limit, withdraw_fee, options),
            key,
        )
        .await
    }

    /// Withdraw a TRC20 amount back to the main chain
    pub async fn withdraw_trc20(
        &self,
        num: i64,
        withdraw_fee: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.withdraw_token(num, withdraw_fee, fee_limit, contract_address, options, key).await
    }

    /// Withdraw a TRC721 token back to the main chain
    pub async fn withdraw_trc721(
        &self,
        id: i64,
        withdraw_fee: i64,
        fee_limit: i64,
        contract_address: &str,
        options: &BridgeOptions,
        key: Option<&str>,
    ) -> Result<String, SdkError> {
        self.withdraw_token(id, withdraw_fee, fee_limit, contract_address, options, key).await
    }
}
