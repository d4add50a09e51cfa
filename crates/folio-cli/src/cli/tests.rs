use super::*;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn parses_config_command() {
    let cli = Cli::try_parse_from([
        "folio", "config", "app", "--dev", "--server", "--build-id", "b1", "--compact",
    ])
    .unwrap();

    let Command::Config(args) = cli.command else {
        panic!("expected config command");
    };
    assert_eq!(args.project.dir, PathBuf::from("app"));
    assert!(args.dev);
    assert!(args.server);
    assert_eq!(args.build_id.as_deref(), Some("b1"));
    assert!(args.compact);
}

#[test]
fn project_dir_defaults_to_cwd() {
    let cli = Cli::try_parse_from(["folio", "pages"]).unwrap();
    let Command::Pages(args) = cli.command else {
        panic!("expected pages command");
    };
    assert_eq!(args.project.dir, PathBuf::from("."));
    assert!(args.project.config.is_none());
    assert!(args.project.framework.is_none());
}

#[test]
fn commons_requires_usage_and_pages() {
    assert!(Cli::try_parse_from(["folio", "commons", "--pages", "3"]).is_err());
    assert!(Cli::try_parse_from(["folio", "commons", "--usage", "u.json"]).is_err());

    let cli = Cli::try_parse_from(["folio", "commons", "--usage", "u.json", "--pages", "3"]).unwrap();
    let Command::Commons(args) = cli.command else {
        panic!("expected commons command");
    };
    assert_eq!(args.pages, 3);
}

#[test]
fn global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["folio", "pages", "-v", "--no-color"]).unwrap();
    assert!(cli.verbose);
    assert!(cli.no_color);
}

#[test]
fn verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["folio", "-v", "-q", "pages"]).is_err());
}
