//! Miniature examples repository used by the unit tests.
//!
//! ```text
//! <tmp>/
//! ├── exemplar.registry.json
//! ├── fhevm-hardhat-template/      base template (with caches that must not be copied)
//! ├── contracts/basic/FHECounter.sol
//! ├── contracts/basic/encrypt/EncryptSingleValue.sol
//! ├── contracts/vault/PrivateVault.sol   imports ../lib/VaultMath.sol
//! ├── contracts/lib/VaultMath.sol
//! ├── test/basic/FHECounter.ts
//! ├── test/basic/encrypt/EncryptSingleValue.ts
//! ├── test/vault/PrivateVault.ts         imports ../fixtures/vaultFixture
//! └── test/fixtures/vaultFixture.ts
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Settings;
use crate::registry::{CategoryEntry, CategoryUnit, DocEntry, ExampleEntry, Registry, RegistryFile};

pub const FHE_COUNTER_SOL: &str = r#"// SPDX-License-Identifier: BSD-3-Clause-Clear
pragma solidity ^0.8.24;

import {FHE, euint32, externalEuint32} from "@fhevm/solidity/lib/FHE.sol";
import {SepoliaConfig} from "@fhevm/solidity/config/ZamaConfig.sol";

/// @title A simple FHE counter contract
/// @notice Keeps an encrypted counter that anyone can increment or decrement.
/// @dev This example demonstrates:
/// - Accepting encrypted inputs with input proofs
/// - Homomorphic addition and subtraction on euint32
/// Key concepts:
/// - Encrypted handle: a reference to a ciphertext held by the coprocessor
/// - ACL: the per-handle access list that decides who may decrypt
/// Educational notes:
/// - Encrypted arithmetic wraps on overflow instead of reverting
/// @custom:chapter basics
contract FHECounter is SepoliaConfig {
    euint32 private _count;

    /// @notice Returns the encrypted count handle.
    function getCount() external view returns (euint32) {
        return _count;
    }

    function increment(externalEuint32 inputEuint32, bytes calldata inputProof) external {
        euint32 encryptedEuint32 = FHE.fromExternal(inputEuint32, inputProof);
        _count = FHE.add(_count, encryptedEuint32);
        FHE.allowThis(_count);
        FHE.allow(_count, msg.sender);
    }

    function decrement(externalEuint32 inputEuint32, bytes calldata inputProof) external {
        euint32 encryptedEuint32 = FHE.fromExternal(inputEuint32, inputProof);
        _count = FHE.sub(_count, encryptedEuint32);
        FHE.allowThis(_count);
        FHE.allow(_count, msg.sender);
    }

    function _reset() internal {
        _count = FHE.asEuint32(0);
    }
}
"#;

pub const FHE_COUNTER_TS: &str = r#"import { FhevmType } from "@fhevm/hardhat-plugin";
import { expect } from "chai";
import { ethers, fhevm } from "hardhat";

describe("FHECounter", function () {
  it("should increment the counter by 1", async function () {
    const input = await fhevm.createEncryptedInput(address, alice.address).add32(1).encrypt();
    await (await contract.connect(alice).increment(input.handles[0], input.inputProof)).wait();
    const clear = await fhevm.userDecryptEuint(FhevmType.euint32, await contract.getCount(), address, alice);
    expect(clear).to.eq(1);
  });

  it("should fail to decrypt without permission", async function () {
    // Bob was never granted access to the handle with FHE.allow
    await expect(fhevm.userDecryptEuint(FhevmType.euint32, handle, address, bob)).to.be.rejected;
  });

  it("should not accept an input encrypted for another contract", async function () {
    await expect(contract.increment(handle, proof)).to.be.reverted;
  });

  it("wrong signer pitfall", async () => {
    // Input proofs are bound to the account that created them
    await expect(contract.connect(bob).increment(handle, proof)).to.be.reverted;
  });

  it("error when decrementing below zero", async function () {
    // Encrypted arithmetic wraps instead of reverting
    expect(true).to.eq(true);
  });
});
"#;

const ENCRYPT_SINGLE_VALUE_SOL: &str = r#"// SPDX-License-Identifier: BSD-3-Clause-Clear
pragma solidity ^0.8.24;

import {FHE, euint64, externalEuint64} from "@fhevm/solidity/lib/FHE.sol";

/// @title Encrypt a single value
/// @notice Stores one encrypted value supplied by the caller.
contract EncryptSingleValue {
    euint64 private _value;

    function store(externalEuint64 input, bytes calldata proof) external {
        _value = FHE.fromExternal(input, proof);
        FHE.allowThis(_value);
        FHE.allow(_value, msg.sender);
    }
}
"#;

const ENCRYPT_SINGLE_VALUE_TS: &str = r#"import { expect } from "chai";

describe("EncryptSingleValue", function () {
  it("stores a value", async function () {
    expect(1).to.eq(1);
  });
});
"#;

pub const PRIVATE_VAULT_SOL: &str = r#"// SPDX-License-Identifier: BSD-3-Clause-Clear
pragma solidity ^0.8.24;

import {FHE, euint64, ebool} from "@fhevm/solidity/lib/FHE.sol";
import {VaultMath} from "../lib/VaultMath.sol";

/// @title Private vault
/// @notice Holds encrypted balances. Withdrawals use FHE.select, so a failed withdrawal looks exactly like a successful one.
contract PrivateVault {
    mapping(address => euint64) private _balances;

    function withdraw(uint64 amount) public {
        euint64 balance = _balances[msg.sender];
        ebool enough = FHE.le(FHE.asEuint64(amount), balance);
        _balances[msg.sender] = FHE.select(enough, FHE.sub(balance, amount), balance);
        FHE.allowThis(_balances[msg.sender]);
        FHE.makePubliclyDecryptable(enough);
    }
}
"#;

const VAULT_MATH_SOL: &str = r#"// SPDX-License-Identifier: BSD-3-Clause-Clear
pragma solidity ^0.8.24;

library VaultMath {
    function cap() internal pure returns (uint64) {
        return 1_000_000;
    }
}
"#;

const PRIVATE_VAULT_TS: &str = r#"import { expect } from "chai";
import { deployVault } from "../fixtures/vaultFixture";

describe("PrivateVault", function () {
  it("withdraws within the balance", async function () {
    const vault = await deployVault();
    expect(vault).to.not.eq(undefined);
  });
});
"#;

const VAULT_FIXTURE_TS: &str = r#"import { ethers } from "hardhat";

export async function deployVault() {
  const factory = await ethers.getContractFactory("PrivateVault");
  return factory.deploy();
}
"#;

const TEMPLATE_PACKAGE_JSON: &str = r#"{
  "name": "fhevm-hardhat-template",
  "description": "Hardhat-based template for developing FHEVM Solidity smart contracts",
  "version": "0.1.0",
  "homepage": "https://github.com/zama-ai/fhevm-hardhat-template",
  "scripts": {
    "compile": "hardhat compile",
    "test": "hardhat test"
  },
  "dependencies": {
    "@fhevm/solidity": "^0.7.0"
  },
  "devDependencies": {
    "@fhevm/hardhat-plugin": "0.0.1",
    "hardhat": "^2.22.0"
  }
}
"#;

const TEMPLATE_DEPLOY_TS: &str = r#"import { DeployFunction } from "hardhat-deploy/types";
import { HardhatRuntimeEnvironment } from "hardhat/types";

const func: DeployFunction = async function (hre: HardhatRuntimeEnvironment) {
  const { deployer } = await hre.getNamedAccounts();
  const { deploy } = hre.deployments;

  const deployedFHECounter = await deploy("FHECounter", {
    from: deployer,
    log: true,
  });

  console.log(`FHECounter contract: `, deployedFHECounter.address);
};
export default func;
func.id = "deploy_fheCounter";
func.tags = ["FHECounter"];
"#;

/// Registry tables matching the files the [`Fixture`] writes.
pub fn registry_file() -> RegistryFile {
    RegistryFile {
        settings: Settings::default(),
        examples: vec![
            ExampleEntry {
                id: "fhe-counter".into(),
                contract: "contracts/basic/FHECounter.sol".into(),
                test: "test/basic/FHECounter.ts".into(),
                description: "An encrypted counter".into(),
                category: "basic".into(),
                dependencies: vec![],
                fixture: None,
            },
            ExampleEntry {
                id: "encrypt-single-value".into(),
                contract: "contracts/basic/encrypt/EncryptSingleValue.sol".into(),
                test: "test/basic/encrypt/EncryptSingleValue.ts".into(),
                description: "Encrypting a single value".into(),
                category: "basic".into(),
                dependencies: vec![],
                fixture: None,
            },
            ExampleEntry {
                id: "private-vault".into(),
                contract: "contracts/vault/PrivateVault.sol".into(),
                test: "test/vault/PrivateVault.ts".into(),
                description: "A vault with private balances".into(),
                category: "vault".into(),
                dependencies: vec!["contracts/lib/VaultMath.sol".into()],
                fixture: Some("test/fixtures/vaultFixture.ts".into()),
            },
        ],
        categories: vec![
            CategoryEntry {
                id: "basic".into(),
                name: "Basic FHE Examples".into(),
                description: "Counters and encrypted inputs".into(),
                contracts: vec![
                    CategoryUnit {
                        contract: "contracts/basic/FHECounter.sol".into(),
                        test: "test/basic/FHECounter.ts".into(),
                        dependencies: vec![],
                        skip_test: false,
                    },
                    CategoryUnit {
                        contract: "contracts/basic/encrypt/EncryptSingleValue.sol".into(),
                        test: "test/basic/encrypt/EncryptSingleValue.ts".into(),
                        dependencies: vec![],
                        skip_test: false,
                    },
                ],
                additional_deps: BTreeMap::new(),
            },
            CategoryEntry {
                id: "vault".into(),
                name: "Vault Examples".into(),
                description: "Confidential balances".into(),
                contracts: vec![CategoryUnit {
                    contract: "contracts/vault/PrivateVault.sol".into(),
                    test: "test/vault/PrivateVault.ts".into(),
                    dependencies: vec![
                        "contracts/lib/VaultMath.sol".into(),
                        "test/fixtures/vaultFixture.ts".into(),
                    ],
                    skip_test: false,
                }],
                additional_deps: BTreeMap::from([(
                    "@openzeppelin/contracts".to_string(),
                    "^5.1.0".to_string(),
                )]),
            },
        ],
        docs: vec![
            DocEntry {
                id: "fhe-counter".into(),
                title: "FHE Counter".into(),
                description: "A counter.".into(),
                contract: "contracts/basic/FHECounter.sol".into(),
                test: "test/basic/FHECounter.ts".into(),
                output: "docs/fhe-counter.md".into(),
                category: "Basic".into(),
                chapter: None,
            },
            DocEntry {
                id: "private-vault".into(),
                title: "Private Vault".into(),
                description: "Confidential balances with FHE.select.".into(),
                contract: "contracts/vault/PrivateVault.sol".into(),
                test: "test/vault/PrivateVault.ts".into(),
                output: "docs/private-vault.md".into(),
                category: "Vaults".into(),
                chapter: Some("advanced".into()),
            },
        ],
    }
}

/// A temporary examples repository.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fx = Self {
            dir: tempfile::tempdir().unwrap(),
        };

        let template = "fhevm-hardhat-template";
        fx.write(&format!("{template}/package.json"), TEMPLATE_PACKAGE_JSON);
        fx.write(&format!("{template}/package-lock.json"), "{}\n");
        fx.write(&format!("{template}/.gitignore"), "node_modules\n");
        fx.write(&format!("{template}/README.md"), "# FHEVM Hardhat Template\n");
        fx.write(&format!("{template}/hardhat.config.ts"), "export default {};\n");
        fx.write(&format!("{template}/contracts/FHECounter.sol"), FHE_COUNTER_SOL);
        fx.write(&format!("{template}/test/FHECounter.ts"), FHE_COUNTER_TS);
        fx.write(&format!("{template}/tasks/FHECounter.ts"), "// tasks\n");
        fx.write(&format!("{template}/deploy/deploy.ts"), TEMPLATE_DEPLOY_TS);
        fx.write(&format!("{template}/node_modules/hardhat/index.js"), "\n");
        fx.write(&format!("{template}/artifacts/build-info/x.json"), "{}\n");

        fx.write("contracts/basic/FHECounter.sol", FHE_COUNTER_SOL);
        fx.write("contracts/basic/encrypt/EncryptSingleValue.sol", ENCRYPT_SINGLE_VALUE_SOL);
        fx.write("contracts/vault/PrivateVault.sol", PRIVATE_VAULT_SOL);
        fx.write("contracts/lib/VaultMath.sol", VAULT_MATH_SOL);
        fx.write("test/basic/FHECounter.ts", FHE_COUNTER_TS);
        fx.write("test/basic/encrypt/EncryptSingleValue.ts", ENCRYPT_SINGLE_VALUE_TS);
        fx.write("test/vault/PrivateVault.ts", PRIVATE_VAULT_TS);
        fx.write("test/fixtures/vaultFixture.ts", VAULT_FIXTURE_TS);

        let registry = serde_json::to_string_pretty(&registry_file()).unwrap();
        fx.write("exemplar.registry.json", &registry);
        fx
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root().join("exemplar.registry.json")
    }

    pub fn registry(&self) -> Registry {
        Registry::new(self.root().to_path_buf(), registry_file()).unwrap()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root().join(relative)).unwrap()
    }
}
