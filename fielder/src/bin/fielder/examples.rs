use crate::commands::{check, inject};
use crate::theme::ICONS;

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "check",
            groups: check::EXAMPLES,
        },
        CommandExample {
            name: "inject",
            groups: inject::EXAMPLES,
        },
    ]
}

impl CommandExample {
    /// `--help` appendix listing the example groups.
    pub fn render(&self) -> String {
        let groups: Vec<String> = self
            .groups
            .iter()
            .map(|group| {
                let commands: Vec<String> = group
                    .commands
                    .iter()
                    .map(|command| format!("    {} {command}", ICONS.arrow))
                    .collect();
                format!("  {}\n{}", group.title, commands.join("\n"))
            })
            .collect();
        format!("Examples:\n{}", groups.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subcommand_has_examples() {
        let names: Vec<&str> = command_examples().iter().map(|example| example.name).collect();
        assert_eq!(names, vec!["check", "inject"]);
        for example in command_examples() {
            let help = example.render();
            assert!(help.starts_with("Examples:\n"), "{help}");
            assert!(help.contains(&format!("fielder {}", example.name)), "{help}");
        }
    }
}
