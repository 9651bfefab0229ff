/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    InteractiveHistory,
    InteractiveConfig(Option<String>),
    ListHistory,
    ListConfig,
    Help,
    /// Arguments to hand to `ssh` unchanged.
    Ssh(Vec<String>),
}

pub const USAGE: &str = "\
usage: sshrecall                  pick a host from history
       sshrecall -                pick a host from ~/.ssh/config
       sshrecall - <term>         same, filtered by <term>
       sshrecall --history        print history
       sshrecall --config         print ssh config hosts
       sshrecall <ssh arguments>  run ssh and remember the connection";

impl Action {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        match args.first().map(String::as_str) {
            None => Action::InteractiveHistory,
            Some("-") => Action::InteractiveConfig(args.get(1).cloned()),
            Some("--history") if args.len() == 1 => Action::ListHistory,
            Some("--config") if args.len() == 1 => Action::ListConfig,
            Some("--help") if args.len() == 1 => Action::Help,
            Some(_) => Action::Ssh(args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], Action::InteractiveHistory)]
    #[case(&["-"], Action::InteractiveConfig(None))]
    #[case(&["-", "prod"], Action::InteractiveConfig(Some("prod".into())))]
    #[case(&["--history"], Action::ListHistory)]
    #[case(&["--config"], Action::ListConfig)]
    #[case(&["--help"], Action::Help)]
    #[case(&["root@h", "-p", "22"], Action::Ssh(vec!["root@h".into(), "-p".into(), "22".into()]))]
    #[case(&["web"], Action::Ssh(vec!["web".into()]))]
    fn maps_arguments_to_actions(#[case] args: &[&str], #[case] expected: Action) {
        assert_eq!(Action::parse(args.iter().copied()), expected);
    }
}
