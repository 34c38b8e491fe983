use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_parse_render_with_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "vg", "render", "plan.yml", "--format", "cqt", "--nested", "-v", "-c", "conf/vg.yml",
    ])
    .unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.config, Some(PathBuf::from("conf/vg.yml")));
    match cli.command {
        Commands::Render(args) => {
            assert_eq!(args.plan, PathBuf::from("plan.yml"));
            assert_eq!(args.format, Some(RenderFormat::Cqt));
            assert!(args.nested);
        }
        other => panic!("expected render, got {other:?}"),
    }
}

#[test]
fn test_render_format_defaults_to_config() {
    let cli = Cli::try_parse_from(["vg", "render", "plan.yml"]).unwrap();
    match cli.command {
        Commands::Render(args) => {
            assert_eq!(args.format, None);
            assert!(!args.nested);
        }
        other => panic!("expected render, got {other:?}"),
    }
}

#[test]
fn test_render_format_maps_to_output_format() {
    assert_eq!(OutputFormat::from(RenderFormat::Json), OutputFormat::Json);
    assert_eq!(OutputFormat::from(RenderFormat::Esql), OutputFormat::Esql);
}

#[test]
fn test_unknown_format_rejected() {
    assert!(Cli::try_parse_from(["vg", "render", "plan.yml", "--format", "sql"]).is_err());
}
