//! Contract interaction helpers

use cypher_primitives::Address;
use serde_json::Value;
use tracing::debug;

use crate::abi::{
    decode_output, decode_revert, encode_params, parse_abi, AbiEntry, AbiParam, EntryKind,
    RevertReason, Token,
};
use crate::client::{BroadcastResult, CypherWeb};
use crate::transaction_builder::TriggerOptions;
use crate::SdkError;

/// ABI plus an optional deployed address
#[derive(Debug, Clone, Default)]
pub struct Contract {
    address: Option<Address>,
    abi: Vec<AbiEntry>,
}

impl Contract {
    /// Contract from ABI entries, not yet bound to an address
    pub fn new(abi: Vec<AbiEntry>) -> Self {
        Self { address: None, abi }
    }

    /// Contract from a JSON ABI
    pub fn from_json(abi: &Value) -> Result<Self, SdkError> {
        Ok(Self::new(parse_abi(abi)?))
    }

    /// Bind to a deployed address (hex or base58)
    pub fn at(mut self, address: &str) -> Result<Self, SdkError> {
        self.address = Some(crate::address::parse_arg(address, "Invalid contract address provided")?);
        Ok(self)
    }

    /// Deployed address, if bound
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// ABI entries
    pub fn abi(&self) -> &[AbiEntry] {
        &self.abi
    }

    /// Look a function up by name, or by full signature for overloads
    pub fn function(&self, name: &str) -> Option<&AbiEntry> {
        let functions = || self.abi.iter().filter(|e| e.entry_kind() == EntryKind::Function);
        if name.contains('(') {
            functions().find(|e| e.signature().ok().as_deref() == Some(name))
        } else {
            functions().find(|e| e.name == name)
        }
    }

    fn require(&self, name: &str) -> Result<&AbiEntry, SdkError> {
        self.function(name)
            .ok_or_else(|| SdkError::invalid_input(format!("Unknown function: {}", name)))
    }

    /// Selector followed by the encoded arguments
    pub fn encode_call(&self, name: &str, args: &[Token]) -> Result<Vec<u8>, SdkError> {
        let function = self.require(name)?;
        let mut data = function.selector()?.to_vec();
        data.extend(encode_params(&function.input_types()?, args)?);
        Ok(data)
    }

    /// Decode the return data of `name`
    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        decode_output(&self.require(name)?.output_types()?, data)
    }

    /// Decode revert data against this contract's custom errors
    pub fn decode_revert(&self, data: &[u8]) -> Result<RevertReason, SdkError> {
        decode_revert(&self.abi, data)
    }
}

/// TRC20 token interface
pub fn trc20(address: &str) -> Result<Contract, SdkError> {
    let view = |name: &str, inputs: Vec<AbiParam>, output: &str| {
        AbiEntry::function(name, inputs, vec![AbiParam::new("", output)], "view")
    };
    let write = |name: &str, inputs: Vec<AbiParam>| {
        AbiEntry::function(name, inputs, vec![AbiParam::new("", "bool")], "nonpayable")
    };

    Contract::new(vec![
        view("name", vec![], "string"),
        view("symbol", vec![], "string"),
        view("decimals", vec![], "uint8"),
        view("totalSupply", vec![], "uint256"),
        view("balanceOf", vec![AbiParam::new("owner", "address")], "uint256"),
        view(
            "allowance",
            vec![AbiParam::new("owner", "address"), AbiParam::new("spender", "address")],
            "uint256",
        ),
        write("transfer", vec![AbiParam::new("to", "address"), AbiParam::new("value", "uint256")]),
        write("approve", vec![AbiParam::new("spender", "address"), AbiParam::new("value", "uint256")]),
        write(
            "transferFrom",
            vec![
                AbiParam::new("from", "address"),
                AbiParam::new("to", "address"),
                AbiParam::new("value", "uint256"),
            ],
        ),
    ])
    .at(address)
}

/// Contract bound to a client
pub struct BoundContract {
    client: CypherWeb,
    contract: Contract,
    address: Address,
}

impl CypherWeb {
    /// Bind a deployed contract to this client
    pub fn contract(&self, contract: Contract) -> Result<BoundContract, SdkError> {
        let address = *contract
            .address()
            .ok_or_else(|| SdkError::invalid_input("Invalid contract address provided"))?;
        Ok(BoundContract { client: self.clone(), contract, address })
    }
}

impl BoundContract {
    /// Underlying contract
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Run a read-only function and decode its outputs
    pub async fn call(&self, name: &str, args: &[Token], issuer: Option<&str>) -> Result<Vec<Token>, SdkError> {
        let function = self.contract.require(name)?;
        let signature = function.signature()?;
        debug!(contract = %self.address, %signature, "contract call");

        let data = self
            .client
            .transaction_builder()
            .trigger_constant_contract(
                &self.address.to_hex(),
                &signature,
                args,
                &TriggerOptions::default(),
                issuer,
            )
            .await?;
        decode_output(&function.output_types()?, &data)
    }

    /// Build, sign and broadcast a state-changing call
    pub async fn send(
        &self,
        name: &str,
        args: &[Token],
        options: &TriggerOptions,
        key: Option<&str>,
    ) -> Result<BroadcastResult, SdkError> {
        let function = self.contract.require(name)?;
        if options.call_value > 0 && !function.is_payable() {
            return Err(SdkError::validation(format!("{} is not payable", name)));
        }
        let signer = self.client.signer(key)?;
        let issuer = signer.address().to_hex();

        let mut tx = self
            .client
            .transaction_builder()
            .trigger_smart_contract(
                &self.address.to_hex(),
                &function.signature()?,
                args,
                options,
                Some(&issuer),
            )
            .await?;
        signer.sign_transaction(&mut tx)?;
        self.client.send_raw_transaction(&tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use cypher_primitives::U256;
    use serde_json::json;
    use std::sync::Arc;

    const TOKEN: &str = "1c742d35cc6634c0532925a3b844bc9e7595f0ab3d";
    const HOLDER: &str = "1c1234567890123456789012345678901234567890";

    fn holder() -> Token {
        Token::Address(Address::from_hex(HOLDER).unwrap())
    }

    #[test]
    fn test_encode_transfer() {
        let contract = trc20(TOKEN).unwrap();
        let data = contract
            .encode_call("transfer", &[holder(), Token::Uint(U256::from(1000))])
            .unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 68);
    }

    #[test]
    fn test_encode_balance_of() {
        let data = trc20(TOKEN).unwrap().encode_call("balanceOf", &[holder()]).unwrap();
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 36);
    }

    #[test]
    fn test_decode_output() {
        let mut data = [0u8; 32];
        data[31] = 100;
        let tokens = trc20(TOKEN).unwrap().decode_output("balanceOf", &data).unwrap();
        assert_eq!(tokens, vec![Token::Uint(U256::from(100))]);
    }

    #[test]
    fn test_unknown_function_and_arity() {
        let contract = trc20(TOKEN).unwrap();
        assert!(contract.encode_call("mint", &[]).is_err());
        assert!(contract.encode_call("transfer", &[holder()]).is_err());
    }

    #[test]
    fn test_lookup_by_signature() {
        let contract = trc20(TOKEN).unwrap();
        assert_eq!(contract.function("approve(address,uint256)").unwrap().name, "approve");
        assert!(contract.function("approve(address)").is_none());
    }

    #[test]
    fn test_from_json_abi() {
        let abi = json!({"entrys": [
            {"type": "Function", "name": "ping", "inputs": [], "outputs": [{"name": "", "type": "bool"}], "stateMutability": "View"}
        ]});
        let contract = Contract::from_json(&abi).unwrap().at(TOKEN).unwrap();
        assert!(contract.function("ping").unwrap().is_constant());
        assert_eq!(contract.address().unwrap().to_hex(), TOKEN);
    }

    #[test]
    fn test_unbound_contract_rejected() {
        let client = CypherWeb::new_mock();
        assert!(client.contract(Contract::new(vec![])).is_err());
    }

    #[tokio::test]
    async fn test_bound_call() {
        let transport = Arc::new(MockTransport::new());
        transport.set_response(
            "wallet/triggerconstantcontract",
            json!({"result": {"result": true}, "constant_result": [format!("{:064x}", 42)]}),
        );
        let client = CypherWeb::with_transport(transport.clone());
        let token = client.contract(trc20(TOKEN).unwrap()).unwrap();

        let balance = token.call("balanceOf", &[holder()], None).await.unwrap();
        assert_eq!(balance, vec![Token::Uint(U256::from(42))]);

        let body = transport.last_request().unwrap().body.unwrap();
        assert_eq!(body["function_selector"], "balanceOf(address)");
        assert_eq!(body["parameter"].as_str().unwrap().len(), 64);
    }
}
