//! Builders for every supported operation, anchored to the node's latest block

use cypher_primitives::Address;
use cypher_proto::contract::abi as proto_abi;
use cypher_proto::{
    AccountUpdateContract, ContractOperation, CreateSmartContract, FreezeBalanceContract,
    ResourceCode, SmartContract, TransferAssetContract, TransferContract, TriggerSmartContract,
    UnfreezeBalanceContract, Vote, VoteWitnessContract, WithdrawBalanceContract,
    WitnessCreateContract, WitnessUpdateContract,
};
use cypher_types::{Transaction, TransactionJson};
use serde_json::{json, Value};
use tracing::debug;

use crate::abi::{
    encode_params, function_selector, signature_types, token_to_json, AbiEntry, EntryKind, Token,
};
use crate::address::parse_arg;
use crate::client::CypherWeb;
use crate::transport::HttpMethod;
use crate::tx_builder::{TxBuilder, MAX_FEE_LIMIT};
use crate::SdkError;

/// Options shared by all builders
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Account permission the signatures are checked against
    pub permission_id: i32,
    /// Memo stored in the transaction
    pub memo: Option<String>,
}

/// Options of a contract call
#[derive(Debug, Clone, Default)]
pub struct TriggerOptions {
    /// Fee limit; the client default applies when unset
    pub fee_limit: Option<i64>,
    /// Native coin sent along, in sun
    pub call_value: i64,
    /// Token sent along
    pub token_id: i64,
    /// Amount of `token_id` sent along
    pub token_value: i64,
    /// Account permission the signatures are checked against
    pub permission_id: i32,
}

/// Contract deployment parameters
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Contract ABI
    pub abi: Vec<AbiEntry>,
    /// Creation bytecode (hex, `0x` optional)
    pub bytecode: String,
    /// Constructor arguments
    pub parameters: Vec<Token>,
    /// Contract name
    pub name: String,
    /// Fee limit; the client default applies when unset
    pub fee_limit: Option<i64>,
    /// Native coin sent to the constructor
    pub call_value: i64,
    /// Share of the energy cost paid by callers, 0 to 100
    pub user_fee_percentage: i64,
    /// Energy the deployer pays per call at most
    pub origin_energy_limit: i64,
    /// Token sent to the constructor
    pub token_id: i64,
    /// Amount of `token_id` sent
    pub token_value: i64,
    /// Account permission the signatures are checked against
    pub permission_id: i32,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            abi: Vec::new(),
            bytecode: String::new(),
            parameters: Vec::new(),
            name: String::new(),
            fee_limit: None,
            call_value: 0,
            user_fee_percentage: 100,
            origin_energy_limit: 10_000_000,
            token_id: 0,
            token_value: 0,
            permission_id: 0,
        }
    }
}

/// Resource obtained by freezing balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resource {
    /// Bandwidth points
    #[default]
    Bandwidth,
    /// Energy for contract execution
    Energy,
}

impl Resource {
    /// Parse `BANDWIDTH` or `ENERGY`
    pub fn parse(s: &str) -> Result<Self, SdkError> {
        match s {
            "BANDWIDTH" => Ok(Resource::Bandwidth),
            "ENERGY" => Ok(Resource::Energy),
            _ => Err(SdkError::invalid_input(
                "Invalid resource provided: Expected \"BANDWIDTH\" or \"ENERGY\"",
            )),
        }
    }

    /// `BANDWIDTH` or `ENERGY`
    pub fn name(self) -> &'static str {
        match self {
            Resource::Bandwidth => "BANDWIDTH",
            Resource::Energy => "ENERGY",
        }
    }

    fn code(self) -> i32 {
        match self {
            Resource::Bandwidth => ResourceCode::Bandwidth as i32,
            Resource::Energy => ResourceCode::Energy as i32,
        }
    }
}

/// Transaction builders bound to a client
pub struct TransactionBuilder<'a> {
    client: &'a CypherWeb,
}

impl CypherWeb {
    /// Builders for unsigned transactions
    pub fn transaction_builder(&self) -> TransactionBuilder<'_> {
        TransactionBuilder { client: self }
    }
}

fn check_fee_limit(fee_limit: Option<i64>) -> Result<(), SdkError> {
    match fee_limit {
        Some(limit) if limit <= 0 || limit > MAX_FEE_LIMIT => {
            Err(SdkError::invalid_input("Invalid feeLimit provided"))
        }
        _ => Ok(()),
    }
}

fn non_negative(value: i64, message: &str) -> Result<(), SdkError> {
    if value < 0 {
        Err(SdkError::invalid_input(message))
    } else {
        Ok(())
    }
}

fn transaction_from_value(value: Value) -> Result<Transaction, SdkError> {
    let json: TransactionJson = crate::transport::deserialize_response(value)?;
    Ok(Transaction::from_json(&json)?)
}

fn build_options_json(options: &BuildOptions) -> Value {
    json!({ "permissionId": options.permission_id, "memo": options.memo })
}

fn trigger_options_json(options: &TriggerOptions) -> Value {
    json!({
        "feeLimit": options.fee_limit,
        "callValue": options.call_value,
        "tokenId": options.token_id,
        "tokenValue": options.token_value,
        "permissionId": options.permission_id,
    })
}

fn deploy_options_json(deploy: &DeployOptions) -> Result<Value, SdkError> {
    Ok(json!({
        "abi": serde_json::to_value(&deploy.abi)?,
        "bytecode": deploy.bytecode,
        "parameters": tokens_json(&deploy.parameters),
        "name": deploy.name,
        "feeLimit": deploy.fee_limit,
        "callValue": deploy.call_value,
        "userFeePercentage": deploy.user_fee_percentage,
        "originEnergyLimit": deploy.origin_energy_limit,
        "tokenId": deploy.token_id,
        "tokenValue": deploy.token_value,
        "permissionId": deploy.permission_id,
    }))
}

fn tokens_json(params: &[Token]) -> Value {
    Value::Array(params.iter().map(token_to_json).collect())
}

fn votes_json(votes: &[(&str, i64)]) -> Value {
    Value::Object(votes.iter().map(|(witness, count)| ((*witness).to_string(), json!(count))).collect())
}

impl<'a> TransactionBuilder<'a> {
    /// Transaction produced by a plugged replacement of `method`, if any
    async fn plugged(&self, method: &str, args: Vec<Value>) -> Option<Result<Transaction, SdkError>> {
        let result = self.client.run_override("transactionBuilder", method, args).await?;
        Some(result.and_then(transaction_from_value))
    }

    fn owner(&self, address: Option<&str>, message: &str) -> Result<Address, SdkError> {
        self.client.owner_or_default(address, message)
    }

    async fn finish(
        &self,
        operation: impl Into<ContractOperation>,
        permission_id: i32,
        memo: Option<&str>,
        fee_limit: Option<i64>,
    ) -> Result<Transaction, SdkError> {
        let block = self.client.get_ref_block().await?;
        let settings = self.client.settings();
        let operation = operation.into();

        let mut builder = TxBuilder::new(operation.clone())
            .ref_block(&block)
            .expiration_window(settings.expiration_ms)
            .permission_id(permission_id);
        if let Some(memo) = memo {
            builder = builder.data(memo.as_bytes().to_vec());
        }
        if let Some(limit) = fee_limit {
            builder = builder.fee_limit(limit);
        } else if matches!(
            operation,
            ContractOperation::TriggerSmartContract(_) | ContractOperation::CreateSmartContract(_)
        ) {
            builder = builder.fee_limit(settings.fee_limit);
        }
        builder.build()
    }

    /// Transfer native coin
    pub async fn send_cyp(
        &self,
        to: &str,
        amount: i64,
        from: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "sendCyp",
                vec![
                    json!(to),
                    json!(amount),
                    json!(from),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let to = parse_arg(to, "Invalid recipient address provided")?;
        if amount <= 0 {
            return Err(SdkError::invalid_input("Invalid amount provided"));
        }
        let from = self.owner(from, "Invalid origin address provided")?;
        if from == to {
            return Err(SdkError::invalid_input("Cannot transfer CYP to the same account"));
        }

        let op = TransferContract {
            owner_address: from.as_bytes().to_vec(),
            to_address: to.as_bytes().to_vec(),
            amount,
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Transfer an issued token
    pub async fn send_token(
        &self,
        to: &str,
        amount: i64,
        token_id: &str,
        from: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "sendToken",
                vec![
                    json!(to),
                    json!(amount),
                    json!(token_id),
                    json!(from),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let to = parse_arg(to, "Invalid recipient address provided")?;
        if amount <= 0 {
            return Err(SdkError::invalid_input("Invalid amount provided"));
        }
        if token_id.is_empty() {
            return Err(SdkError::invalid_input("Invalid token ID provided"));
        }
        let from = self.owner(from, "Invalid origin address provided")?;
        if from == to {
            return Err(SdkError::invalid_input("Cannot transfer tokens to the same account"));
        }

        let op = TransferAssetContract {
            asset_name: token_id.as_bytes().to_vec(),
            owner_address: from.as_bytes().to_vec(),
            to_address: to.as_bytes().to_vec(),
            amount,
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Vote for witnesses
    pub async fn vote(
        &self,
        votes: &[(&str, i64)],
        voter: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "vote",
                vec![
                    votes_json(votes),
                    json!(voter),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let voter = self.owner(voter, "Invalid voter address provided")?;
        let votes = votes
            .iter()
            .map(|(witness, count)| {
                let witness = parse_arg(witness, "Invalid SR address provided")?;
                if *count <= 0 {
                    return Err(SdkError::invalid_input("Invalid vote count provided"));
                }
                Ok(Vote {
                    vote_address: witness.as_bytes().to_vec(),
                    vote_count: *count,
                })
            })
            .collect::<Result<Vec<_>, SdkError>>()?;

        let op = VoteWitnessContract {
            owner_address: voter.as_bytes().to_vec(),
            votes,
            support: false,
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Apply to become a witness
    pub async fn create_witness(
        &self,
        url: &str,
        address: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "createWitness",
                vec![
                    json!(url),
                    json!(address),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let owner = self.owner(address, "Invalid address provided")?;
        if !crate::utils::is_valid_url(url) {
            return Err(SdkError::invalid_input("Invalid url provided"));
        }
        let op = WitnessCreateContract {
            owner_address: owner.as_bytes().to_vec(),
            url: url.as_bytes().to_vec(),
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Change a witness URL
    pub async fn update_witness(
        &self,
        url: &str,
        address: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "updateWitness",
                vec![
                    json!(url),
                    json!(address),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let owner = self.owner(address, "Invalid address provided")?;
        if !crate::utils::is_valid_url(url) {
            return Err(SdkError::invalid_input("Invalid url provided"));
        }
        let op = WitnessUpdateContract {
            owner_address: owner.as_bytes().to_vec(),
            update_url: url.as_bytes().to_vec(),
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Set the account name
    pub async fn update_account(
        &self,
        account_name: &str,
        address: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "updateAccount",
                vec![
                    json!(account_name),
                    json!(address),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        if account_name.is_empty() {
            return Err(SdkError::invalid_input("Invalid accountName provided"));
        }
        let owner = self.owner(address, "Invalid origin address provided")?;
        let op = AccountUpdateContract {
            account_name: account_name.as_bytes().to_vec(),
            owner_address: owner.as_bytes().to_vec(),
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Freeze balance for bandwidth or energy, optionally delegated
    pub async fn freeze_balance(
        &self,
        amount: i64,
        duration_days: i64,
        resource: Resource,
        address: Option<&str>,
        receiver: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "freezeBalance",
                vec![
                    json!(amount),
                    json!(duration_days),
                    json!(resource.name()),
                    json!(address),
                    json!(receiver),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        if amount <= 0 {
            return Err(SdkError::invalid_input("Invalid amount provided"));
        }
        if duration_days < 3 {
            return Err(SdkError::invalid_input("Invalid duration provided, minimum of 3 days"));
        }
        let owner = self.owner(address, "Invalid origin address provided")?;
        let receiver = receiver
            .map(|r| parse_arg(r, "Invalid receiver address provided"))
            .transpose()?
            .filter(|r| *r != owner);

        let op = FreezeBalanceContract {
            owner_address: owner.as_bytes().to_vec(),
            frozen_balance: amount,
            frozen_duration: duration_days,
            resource: resource.code(),
            receiver_address: receiver.map(|r| r.as_bytes().to_vec()).unwrap_or_default(),
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Unfreeze previously frozen balance
    pub async fn unfreeze_balance(
        &self,
        resource: Resource,
        address: Option<&str>,
        receiver: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "unfreezeBalance",
                vec![
                    json!(resource.name()),
                    json!(address),
                    json!(receiver),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let owner = self.owner(address, "Invalid origin address provided")?;
        let receiver = receiver
            .map(|r| parse_arg(r, "Invalid receiver address provided"))
            .transpose()?
            .filter(|r| *r != owner);

        let op = UnfreezeBalanceContract {
            owner_address: owner.as_bytes().to_vec(),
            resource: resource.code(),
            receiver_address: receiver.map(|r| r.as_bytes().to_vec()).unwrap_or_default(),
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Claim accumulated witness rewards
    pub async fn withdraw_block_rewards(
        &self,
        address: Option<&str>,
        options: &BuildOptions,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "withdrawBlockRewards",
                vec![
                    json!(address),
                    build_options_json(options),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let owner = self.owner(address, "Invalid address provided")?;
        let op = WithdrawBalanceContract {
            owner_address: owner.as_bytes().to_vec(),
        };
        self.finish(op, options.permission_id, options.memo.as_deref(), None).await
    }

    /// Deploy a contract
    pub async fn create_smart_contract(
        &self,
        deploy: &DeployOptions,
        issuer: Option<&str>,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "createSmartContract",
                vec![
                    deploy_options_json(deploy)?,
                    json!(issuer),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let bytecode = deploy.bytecode.strip_prefix("0x").unwrap_or(&deploy.bytecode);
        if !crate::utils::is_hex(bytecode) {
            return Err(SdkError::invalid_input("Invalid contract bytecode provided"));
        }
        check_fee_limit(deploy.fee_limit)?;
        non_negative(deploy.call_value, "Invalid callValue provided")?;
        if !(0..=100).contains(&deploy.user_fee_percentage) {
            return Err(SdkError::invalid_input("Invalid options.userFeePercentage provided"));
        }
        if deploy.origin_energy_limit <= 0 {
            return Err(SdkError::invalid_input("Invalid options.originEnergyLimit provided"));
        }
        non_negative(deploy.token_id, "Invalid options.tokenId provided")?;
        non_negative(deploy.token_value, "Invalid options.tokenValue provided")?;
        let owner = self.owner(issuer, "Invalid issuer address provided")?;

        let mut code = hex::decode(bytecode)?;
        if !deploy.parameters.is_empty() {
            let constructor = deploy
                .abi
                .iter()
                .find(|e| e.entry_kind() == EntryKind::Constructor)
                .ok_or_else(|| SdkError::invalid_input("Constructor parameters given without a constructor"))?;
            code.extend(encode_params(&constructor.input_types()?, &deploy.parameters)?);
        }

        let op = CreateSmartContract {
            owner_address: owner.as_bytes().to_vec(),
            new_contract: Some(SmartContract {
                origin_address: owner.as_bytes().to_vec(),
                abi: Some(proto_abi::Abi {
                    entrys: deploy.abi.iter().map(abi_entry_to_proto).collect(),
                }),
                bytecode: code,
                call_value: deploy.call_value,
                consume_user_resource_percent: deploy.user_fee_percentage,
                name: deploy.name.clone(),
                origin_energy_limit: deploy.origin_energy_limit,
                ..Default::default()
            }),
            call_token_value: deploy.token_value,
            token_id: deploy.token_id,
        };
        self.finish(op, deploy.permission_id, None, deploy.fee_limit).await
    }

    fn call_data(function_selector_sig: &str, params: &[Token]) -> Result<Vec<u8>, SdkError> {
        if function_selector_sig.trim().is_empty() {
            return Err(SdkError::invalid_input("Invalid function selector provided"));
        }
        let signature: String = function_selector_sig.chars().filter(|c| !c.is_whitespace()).collect();
        let types = signature_types(&signature)?;
        encode_params(&types, params)
    }

    /// Build a state-changing contract call
    pub async fn trigger_smart_contract(
        &self,
        contract_address: &str,
        function_selector_sig: &str,
        params: &[Token],
        options: &TriggerOptions,
        issuer: Option<&str>,
    ) -> Result<Transaction, SdkError> {
        let plugged = self
            .plugged(
                "triggerSmartContract",
                vec![
                    json!(contract_address),
                    json!(function_selector_sig),
                    trigger_options_json(options),
                    tokens_json(params),
                    json!(issuer),
                ],
            )
            .await;
        if let Some(tx) = plugged {
            return tx;
        }
        let contract = parse_arg(contract_address, "Invalid contract address provided")?;
        let owner = self.owner(issuer, "Invalid issuer address provided")?;
        check_fee_limit(options.fee_limit)?;
        non_negative(options.call_value, "Invalid call value provided")?;
        non_negative(options.token_id, "Invalid token id provided")?;
        non_negative(options.token_value, "Invalid token value provided")?;

        let signature: String = function_selector_sig.chars().filter(|c| !c.is_whitespace()).collect();
        let mut data = function_selector(&signature).to_vec();
        data.extend(Self::call_data(function_selector_sig, params)?);

        let op = TriggerSmartContract {
            owner_address: owner.as_bytes().to_vec(),
            contract_address: contract.as_bytes().to_vec(),
            call_value: options.call_value,
            data,
            call_token_value: options.token_value,
            token_id: options.token_id,
        };
        self.finish(op, options.permission_id, None, options.fee_limit).await
    }

    /// Run a read-only call on the node and return the raw result bytes
    ///
    /// Without an issuer or default address the call is made from the zero
    /// account.
    pub async fn trigger_constant_contract(
        &self,
        contract_address: &str,
        function_selector_sig: &str,
        params: &[Token],
        options: &TriggerOptions,
        issuer: Option<&str>,
    ) -> Result<Vec<u8>, SdkError> {
        let args = vec![
            json!(contract_address),
            json!(function_selector_sig),
            trigger_options_json(options),
            tokens_json(params),
            json!(issuer),
        ];
        let plugged = self
            .client
            .run_override("transactionBuilder", "triggerConstantContract", args)
            .await;
        if let Some(result) = plugged {
            let output = result?;
            let output = output
                .as_str()
                .ok_or_else(|| SdkError::Serialization("constant call result must be a hex string".into()))?;
            return Ok(hex::decode(output.strip_prefix("0x").unwrap_or(output))?);
        }
        let contract = parse_arg(contract_address, "Invalid contract address provided")?;
        let owner = match issuer {
            Some(issuer) => parse_arg(issuer, "Invalid issuer address provided")?,
            None => self
                .client
                .default_address()
                .unwrap_or_else(|| Address::from_account_id([0u8; 20])),
        };
        non_negative(options.call_value, "Invalid call value provided")?;
        let parameter = Self::call_data(function_selector_sig, params)?;
        let signature: String = function_selector_sig.chars().filter(|c| !c.is_whitespace()).collect();

        let mut body = json!({
            "owner_address": owner.to_hex(),
            "contract_address": contract.to_hex(),
            "function_selector": signature,
            "parameter": hex::encode(parameter),
            "visible": false,
        });
        if options.call_value > 0 {
            body["call_value"] = json!(options.call_value);
        }
        if options.token_value > 0 {
            body["call_token_value"] = json!(options.token_value);
            body["token_id"] = json!(options.token_id);
        }

        debug!(contract = %contract, function = %signature, "constant call");
        let response = self
            .client
            .full_node()
            .request("wallet/triggerconstantcontract", Some(body), HttpMethod::Post)
            .await?;

        if response["result"]["result"].as_bool() != Some(true) {
            return Err(SdkError::Remote(response));
        }
        match response["constant_result"].get(0).and_then(Value::as_str) {
            Some(result) => Ok(hex::decode(result)?),
            None => Ok(Vec::new()),
        }
    }
}

fn abi_entry_to_proto(entry: &AbiEntry) -> proto_abi::Entry {
    let kind = match entry.entry_kind() {
        EntryKind::Function => proto_abi::EntryType::Function,
        EntryKind::Constructor => proto_abi::EntryType::Constructor,
        EntryKind::Event => proto_abi::EntryType::Event,
        EntryKind::Error => proto_abi::EntryType::Error,
        EntryKind::Fallback => proto_abi::EntryType::Fallback,
        EntryKind::Receive => proto_abi::EntryType::Receive,
    };
    let mutability = match entry
        .state_mutability
        .as_deref()
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pure") => proto_abi::StateMutabilityType::Pure,
        Some("view") => proto_abi::StateMutabilityType::View,
        Some("nonpayable") => proto_abi::StateMutabilityType::Nonpayable,
        Some("payable") => proto_abi::StateMutabilityType::Payable,
        _ => proto_abi::StateMutabilityType::UnknownMutabilityType,
    };
    let param = |p: &crate::abi::AbiParam| proto_abi::Param {
        indexed: p.indexed,
        name: p.name.clone(),
        r#type: p.param_type().map(|t| t.to_string()).unwrap_or_else(|_| p.kind.clone()),
    };
    proto_abi::Entry {
        anonymous: entry.anonymous,
        constant: entry.is_constant(),
        name: entry.name.clone(),
        inputs: entry.inputs.iter().map(param).collect(),
        outputs: entry.outputs.iter().map(param).collect(),
        r#type: kind as i32,
        payable: entry.is_payable(),
        state_mutability: mutability as i32,
    }
}
