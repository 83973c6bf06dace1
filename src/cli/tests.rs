use super::*;
use crate::core::deploy::ModelSource;
use clap::Parser;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["modeldeck", "--server-url", "http://gpu/stream"]);

    assert!(args.command.is_none());
    assert_eq!(args.server_url.as_deref(), Some("http://gpu/stream"));
    assert!(!args.verbose);
}

#[test]
fn chat_flags_parse() {
    let args = parse_args(&["modeldeck", "chat", "--history", "h.json", "-l", "chat.log", "-v"]);

    match args.command {
        Some(Commands::Chat(chat)) => {
            assert_eq!(chat.history, Some(PathBuf::from("h.json")));
            assert_eq!(chat.log.as_deref(), Some("chat.log"));
        }
        other => panic!("expected chat, got {other:?}"),
    }
    assert!(args.verbose);
}

#[test]
fn say_joins_words() {
    let args = parse_args(&["modeldeck", "say", "what", "is", "-1?"]);

    match args.command {
        Some(Commands::Say { prompt }) => assert_eq!(prompt.join(" "), "what is -1?"),
        other => panic!("expected say, got {other:?}"),
    }
}

#[test]
fn deploy_requires_exactly_one_model_location() {
    assert!(Args::try_parse_from(["modeldeck", "deploy", "--host", "1.2.3.4"]).is_err());
    assert!(Args::try_parse_from([
        "modeldeck",
        "deploy",
        "--host",
        "1.2.3.4",
        "--hf",
        "org/model",
        "--model-file",
        "m.bin",
    ])
    .is_err());
}

#[test]
fn hf_token_is_rejected_alongside_a_model_file() {
    let err = Args::try_parse_from([
        "modeldeck",
        "deploy",
        "--host",
        "1.2.3.4",
        "--model-file",
        "m.bin",
        "--hf-token",
        "secret",
    ])
    .unwrap_err();

    assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[test]
fn hugging_face_deploy_builds_request() {
    let args = parse_args(&[
        "modeldeck",
        "deploy",
        "--host",
        "1.2.3.4",
        "--hf",
        "org/model",
        "--hf-token",
        "secret",
        "--ssh-user",
        "ubuntu",
        "--ssh-key",
        "/keys/id",
        "--chat",
    ]);

    let Some(Commands::Deploy(deploy)) = args.command else {
        panic!("expected deploy subcommand");
    };
    assert!(deploy.chat);
    let request = deploy.to_request();
    assert_eq!(request.host, "1.2.3.4");
    assert_eq!(request.model_source, ModelSource::HuggingFace);
    assert_eq!(request.hf_link, "org/model");
    assert_eq!(request.hf_token.as_deref(), Some("secret"));
    assert_eq!(request.ssh_user.as_deref(), Some("ubuntu"));
    assert_eq!(request.ssh_key_file, Some(PathBuf::from("/keys/id")));
    assert!(request.validate().is_ok());
}

#[test]
fn local_deploy_builds_request() {
    let args = parse_args(&["modeldeck", "deploy", "--host", "gpu", "--model-file", "m.gguf"]);

    let Some(Commands::Deploy(deploy)) = args.command else {
        panic!("expected deploy subcommand");
    };
    let request = deploy.to_request();
    assert_eq!(request.model_source, ModelSource::Local);
    assert_eq!(request.model_file, Some(PathBuf::from("m.gguf")));
    assert!(!deploy.chat);
}

#[test]
fn set_collects_value_words() {
    let args = parse_args(&["modeldeck", "set", "ssh-user", "deploy", "bot"]);

    match args.command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key, "ssh-user");
            assert_eq!(value, vec!["deploy".to_string(), "bot".to_string()]);
        }
        other => panic!("expected set, got {other:?}"),
    }
}
