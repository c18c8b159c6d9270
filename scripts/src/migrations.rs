//! The numbered migration plan
//!
//! Steps run in ascending order. Later steps may rely on contracts deployed by
//! earlier ones, so the order is kept even where no dependency exists today.

use crate::{
    errors::DeployError,
    specs::{build_spec, find_interface, DeploymentSpec, ParamTable},
};

/// A single numbered migration
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    /// The migration number
    pub number: u32,
    /// The contract deployed by this step
    pub contract_name: &'static str,
    /// The constructor interface version the step targets
    pub version: u32,
}

/// The migration plan, in execution order
pub const MIGRATIONS: [MigrationStep; 4] = [
    MigrationStep {
        number: 2,
        contract_name: "BattleRoyale",
        version: 1,
    },
    MigrationStep {
        number: 4,
        contract_name: "BattleRoyaleRandom",
        version: 2,
    },
    MigrationStep {
        number: 5,
        contract_name: "BattleRoyalePiece",
        version: 1,
    },
    MigrationStep {
        number: 6,
        contract_name: "BattleRoyaleRandomPart",
        version: 1,
    },
];

/// Select the steps numbered within `from..=to`, in ascending order
pub fn select_steps(
    steps: &[MigrationStep],
    from: Option<u32>,
    to: Option<u32>,
) -> Vec<MigrationStep> {
    let mut selected: Vec<_> = steps
        .iter()
        .filter(|s| from.map_or(true, |f| s.number >= f))
        .filter(|s| to.map_or(true, |t| s.number <= t))
        .copied()
        .collect();
    // Stable, so equally numbered steps keep their declared order
    selected.sort_by_key(|s| s.number);

    selected
}

/// Build the deployment specs of the given steps
pub fn plan_specs(
    steps: &[MigrationStep],
    params: &ParamTable,
) -> Result<Vec<DeploymentSpec>, DeployError> {
    steps
        .iter()
        .map(|step| {
            let interface = find_interface(step.contract_name, Some(step.version))?;
            build_spec(interface, params)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{plan_specs, select_steps, MigrationStep, MIGRATIONS};
    use crate::specs::ParamTable;

    #[test]
    fn test_full_plan() {
        let steps = select_steps(&MIGRATIONS, None, None);
        let specs = plan_specs(&steps, &ParamTable::nifty_royale()).unwrap();

        let names: Vec<_> = specs.iter().map(|s| s.contract_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "BattleRoyale",
                "BattleRoyaleRandom",
                "BattleRoyalePiece",
                "BattleRoyaleRandomPart"
            ]
        );
        assert_eq!(specs[1].constructor_args.len(), 6);
        assert_eq!(specs[2].constructor_args.len(), 7);
        assert_eq!(specs[3].constructor_args.len(), 5);
    }

    #[test]
    fn test_bounded_selection() {
        let numbers: Vec<_> = select_steps(&MIGRATIONS, Some(4), Some(5))
            .iter()
            .map(|s| s.number)
            .collect();
        assert_eq!(numbers, vec![4, 5]);

        assert!(select_steps(&MIGRATIONS, Some(7), None).is_empty());
    }

    #[test]
    fn test_out_of_order_steps_sorted() {
        let steps = [
            MigrationStep {
                number: 6,
                contract_name: "BattleRoyaleRandomPart",
                version: 1,
            },
            MigrationStep {
                number: 2,
                contract_name: "BattleRoyale",
                version: 1,
            },
        ];

        let numbers: Vec<_> = select_steps(&steps, None, None)
            .iter()
            .map(|s| s.number)
            .collect();
        assert_eq!(numbers, vec![2, 6]);
    }

    #[test]
    fn test_unknown_version_fails() {
        let steps = [MigrationStep {
            number: 1,
            contract_name: "BattleRoyalePiece",
            version: 7,
        }];
        assert!(plan_specs(&steps, &ParamTable::nifty_royale()).is_err());
    }
}
