// Property tests: idempotence, line-count preservation, chain exclusivity

use chisel::eval::Parameters;
use chisel::process;
use proptest::prelude::*;

const CONSTANTS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

/// One generated chunk of an annotated file.
#[derive(Debug, Clone)]
enum Item {
    Code(String),
    Single { guard: usize, body: String, wrapped: bool },
    Chain { guards: Vec<usize>, else_branch: bool, bodies: Vec<Vec<String>> },
}

fn statement() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", 0..100u32).prop_map(|(name, n)| format!("{}({});", name, n))
}

fn item() -> impl Strategy<Value = Item> {
    prop_oneof![
        statement().prop_map(Item::Code),
        (0..CONSTANTS.len(), statement(), any::<bool>())
            .prop_map(|(guard, body, wrapped)| Item::Single { guard, body, wrapped }),
        (prop::collection::vec(0..CONSTANTS.len(), 1..4), any::<bool>())
            .prop_flat_map(|(guards, else_branch)| {
                let branches = guards.len() + usize::from(else_branch);
                (
                    Just(guards),
                    Just(else_branch),
                    prop::collection::vec(prop::collection::vec(statement(), 1..3), branches),
                )
            })
            .prop_map(|(guards, else_branch, bodies)| Item::Chain {
                guards,
                else_branch,
                bodies,
            }),
    ]
}

fn render(items: &[Item]) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            Item::Code(code) => {
                out.push_str(code);
                out.push('\n');
            }
            Item::Single { guard, body, wrapped } => {
                out.push_str(&format!("/*? if {} */\n", CONSTANTS[*guard]));
                if *wrapped {
                    out.push_str(&format!("    /*{}*/\n", body));
                } else {
                    out.push_str(&format!("    {}\n", body));
                }
            }
            Item::Chain { guards, else_branch, bodies } => {
                for (idx, body) in bodies.iter().enumerate() {
                    match (idx, guards.get(idx)) {
                        (0, Some(guard)) => out.push_str(&format!("/*? if {} {{*/\n", CONSTANTS[*guard])),
                        (_, Some(guard)) => out.push_str(&format!("/*?}} elif {} {{*/\n", CONSTANTS[*guard])),
                        (_, None) => {
                            debug_assert!(*else_branch);
                            out.push_str("/*?} else {*/\n");
                        }
                    }
                    for line in body {
                        out.push_str("    ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                out.push_str("/*?}*/\n");
            }
        }
    }
    out
}

fn parameters() -> impl Strategy<Value = Parameters> {
    prop::collection::vec(any::<bool>(), CONSTANTS.len()).prop_map(|values| {
        CONSTANTS
            .iter()
            .zip(values)
            .fold(Parameters::new(), |params, (name, value)| params.define(*name, value))
    })
}

proptest! {
    #[test]
    fn prop_processing_is_idempotent(items in prop::collection::vec(item(), 0..8), params in parameters()) {
        let source = render(&items);
        let once = process(&source, &params).unwrap().text;
        let twice = process(&once, &params).unwrap().text;
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_line_count_is_preserved(items in prop::collection::vec(item(), 0..8), params in parameters()) {
        let source = render(&items);
        let output = process(&source, &params).unwrap().text;
        prop_assert_eq!(output.lines().count(), source.lines().count());
        prop_assert_eq!(output.matches('\n').count(), source.matches('\n').count());
    }

    #[test]
    fn prop_switching_parameters_round_trips(
        items in prop::collection::vec(item(), 0..8),
        first in parameters(),
        second in parameters(),
    ) {
        let source = render(&items);
        let a = process(&source, &first).unwrap().text;
        let b = process(&a, &second).unwrap().text;
        let back = process(&b, &first).unwrap().text;
        prop_assert_eq!(a, back);
    }

    #[test]
    fn prop_chain_with_else_activates_one_branch(
        guards in prop::collection::vec(0..CONSTANTS.len(), 1..4),
        params in parameters(),
    ) {
        let bodies: Vec<Vec<String>> = (0..=guards.len())
            .map(|idx| vec![format!("branch{}();", idx)])
            .collect();
        let source = render(&[Item::Chain { guards, else_branch: true, bodies }]);
        let output = process(&source, &params).unwrap().text;

        let active = output
            .lines()
            .filter(|line| line.trim_start().starts_with("branch"))
            .count();
        prop_assert_eq!(active, 1);
    }
}
