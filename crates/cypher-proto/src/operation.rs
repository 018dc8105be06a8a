//! Tagged union over every supported contract operation

use prost::Message;

use crate::contract::*;
use crate::transaction::{transaction::Contract, Any, ContractType};
use crate::ProtoError;

macro_rules! operations {
    ($($variant:ident($msg:ty) => $kind:ident),* $(,)?) => {
        /// One on-chain operation with its typed payload
        #[derive(Clone, Debug, PartialEq)]
        pub enum ContractOperation {
            $(
                #[allow(missing_docs)]
                $variant($msg),
            )*
        }

        impl ContractOperation {
            /// Protocol contract type of this operation
            pub fn contract_type(&self) -> ContractType {
                match self {
                    $(ContractOperation::$variant(_) => ContractType::$kind,)*
                }
            }

            /// Serialized payload bytes
            pub fn encode_payload(&self) -> Vec<u8> {
                match self {
                    $(ContractOperation::$variant(m) => m.encode_to_vec(),)*
                }
            }

            /// Raw 21-byte owner address carried by the payload
            pub fn owner_address(&self) -> &[u8] {
                match self {
                    $(ContractOperation::$variant(m) => &m.owner_address,)*
                }
            }

            fn decode_payload(kind: ContractType, bytes: &[u8]) -> Result<Self, ProtoError> {
                match kind {
                    $(ContractType::$kind => Ok(ContractOperation::$variant(<$msg>::decode(bytes)?)),)*
                    #[allow(unreachable_patterns)]
                    other => Err(ProtoError::UnsupportedContract(other as i32)),
                }
            }
        }

        $(
            impl From<$msg> for ContractOperation {
                fn from(m: $msg) -> Self {
                    ContractOperation::$variant(m)
                }
            }
        )*
    };
}

operations! {
    AccountCreate(AccountCreateContract) => AccountCreateContract,
    Transfer(TransferContract) => TransferContract,
    TransferAsset(TransferAssetContract) => TransferAssetContract,
    VoteWitness(VoteWitnessContract) => VoteWitnessContract,
    WitnessCreate(WitnessCreateContract) => WitnessCreateContract,
    WitnessUpdate(WitnessUpdateContract) => WitnessUpdateContract,
    AccountUpdate(AccountUpdateContract) => AccountUpdateContract,
    FreezeBalance(FreezeBalanceContract) => FreezeBalanceContract,
    UnfreezeBalance(UnfreezeBalanceContract) => UnfreezeBalanceContract,
    WithdrawBalance(WithdrawBalanceContract) => WithdrawBalanceContract,
    CreateSmartContract(CreateSmartContract) => CreateSmartContract,
    TriggerSmartContract(TriggerSmartContract) => TriggerSmartContract,
    UpdateSetting(UpdateSettingContract) => UpdateSettingContract,
    UpdateEnergyLimit(UpdateEnergyLimitContract) => UpdateEnergyLimitContract,
    ClearAbi(ClearAbiContract) => ClearAbiContract,
    UpdateBrokerage(UpdateBrokerageContract) => UpdateBrokerageContract,
}

impl ContractOperation {
    /// Pack into a transaction contract entry
    pub fn to_contract(&self, permission_id: i32) -> Contract {
        let kind = self.contract_type();
        Contract {
            r#type: kind as i32,
            parameter: Some(Any {
                type_url: kind.type_url(),
                value: self.encode_payload(),
            }),
            permission_id,
            ..Default::default()
        }
    }

    /// Unpack a transaction contract entry
    pub fn from_contract(contract: &Contract) -> Result<Self, ProtoError> {
        let kind = ContractType::try_from(contract.r#type)
            .map_err(|_| ProtoError::UnsupportedContract(contract.r#type))?;
        let parameter = contract.parameter.as_ref().ok_or(ProtoError::MissingParameter)?;

        let expected = kind.type_url();
        if !parameter.type_url.is_empty() && parameter.type_url != expected {
            return Err(ProtoError::TypeUrlMismatch {
                expected,
                got: parameter.type_url.clone(),
            });
        }
        Self::decode_payload(kind, &parameter.value)
    }
}
