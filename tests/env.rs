use llm_oneshot::{
    env::{DotEnv, Environment, DEFAULT_FILENAME},
    error::{Error, Result},
};
use std::{collections::HashMap, fs};

#[test]
fn parses_pairs_in_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(DEFAULT_FILENAME);
    fs::write(
        &path,
        "# credentials\nOPENAI_API_KEY=sk-file\n\nGREETING=\"hello world\"\nSINGLE='quoted'\n",
    )?;

    let dotenv = DotEnv::from_path(&path)?;
    assert_eq!(dotenv.path(), path.as_path());
    assert_eq!(
        dotenv.vars(),
        &[
            ("OPENAI_API_KEY".to_owned(), "sk-file".to_owned()),
            ("GREETING".to_owned(), "hello world".to_owned()),
            ("SINGLE".to_owned(), "quoted".to_owned()),
        ]
    );
    assert_eq!(dotenv.get("GREETING"), Some("hello world"));
    assert_eq!(dotenv.get("MISSING"), None);
    return Ok(());
}

#[test]
fn finds_file_in_ancestor() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested)?;
    fs::write(dir.path().join(DEFAULT_FILENAME), "OPENAI_API_KEY=sk-root\n")?;

    let found = DotEnv::find(&nested).expect("file in ancestor");
    assert_eq!(found, dir.path().join(DEFAULT_FILENAME));

    let dotenv = DotEnv::discover_from(&nested)?.expect("file in ancestor");
    assert_eq!(dotenv.get("OPENAI_API_KEY"), Some("sk-root"));
    return Ok(());
}

#[test]
fn closest_file_wins() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("project");
    fs::create_dir_all(&nested)?;
    fs::write(dir.path().join(DEFAULT_FILENAME), "OPENAI_API_KEY=sk-outer\n")?;
    fs::write(nested.join(DEFAULT_FILENAME), "OPENAI_API_KEY=sk-inner\n")?;

    let dotenv = DotEnv::discover_from(&nested)?.expect("file in start directory");
    assert_eq!(dotenv.get("OPENAI_API_KEY"), Some("sk-inner"));
    return Ok(());
}

#[test]
fn missing_file_is_not_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("empty");
    fs::create_dir_all(&nested)?;

    // a `.env` above the temp dir would be picked up, so only check what lives inside it
    if let Some(dotenv) = DotEnv::discover_from(&nested)? {
        assert!(!dotenv.path().starts_with(dir.path()));
    }
    return Ok(());
}

#[test]
fn malformed_line_is_skipped() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(DEFAULT_FILENAME);
    fs::write(
        &path,
        "OPENAI_API_KEY=sk-file\nthis line is a typo\nOPENAI_ORGANIZATION=org-file\n",
    )?;

    let dotenv = DotEnv::discover_from(dir.path())?.expect("configuration file");
    assert_eq!(
        dotenv.vars(),
        &[
            ("OPENAI_API_KEY".to_owned(), "sk-file".to_owned()),
            ("OPENAI_ORGANIZATION".to_owned(), "org-file".to_owned()),
        ]
    );

    let mut env = HashMap::<String, String>::new();
    dotenv.merge_into(&mut env);
    assert_eq!(env.var("OPENAI_API_KEY").as_deref(), Some("sk-file"));
    return Ok(());
}

#[test]
fn unreadable_file_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let err = DotEnv::from_path(dir.path().join(DEFAULT_FILENAME)).unwrap_err();
    assert!(matches!(err, Error::Dotenv(dotenv::Error::Io(_))), "{err:?}");
    return Ok(());
}

#[test]
fn merge_inserts_absent_keys() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(DEFAULT_FILENAME);
    fs::write(&path, "OPENAI_API_KEY=sk-file\nOPENAI_ORGANIZATION=org-file\n")?;

    let dotenv = DotEnv::from_path(&path)?;
    let mut env = HashMap::<String, String>::new();
    let inserted = dotenv.merge_into(&mut env);

    assert_eq!(inserted, ["OPENAI_API_KEY", "OPENAI_ORGANIZATION"]);
    assert_eq!(env.var("OPENAI_API_KEY").as_deref(), Some("sk-file"));
    assert_eq!(env.var("OPENAI_ORGANIZATION").as_deref(), Some("org-file"));
    return Ok(());
}

#[test]
fn merge_does_not_override() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(DEFAULT_FILENAME);
    fs::write(&path, "OPENAI_API_KEY=sk-file\nOTHER=value\n")?;

    let dotenv = DotEnv::from_path(&path)?;
    let mut env = HashMap::from([("OPENAI_API_KEY".to_owned(), "sk-shell".to_owned())]);
    let inserted = dotenv.merge_into(&mut env);

    assert_eq!(inserted, ["OTHER"]);
    assert_eq!(env.var("OPENAI_API_KEY").as_deref(), Some("sk-shell"));
    return Ok(());
}

#[test]
fn first_definition_wins() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(DEFAULT_FILENAME);
    fs::write(&path, "DUPLICATE=first\nDUPLICATE=second\n")?;

    let dotenv = DotEnv::from_path(&path)?;
    let mut env = HashMap::<String, String>::new();
    dotenv.merge_into(&mut env);

    assert_eq!(dotenv.get("DUPLICATE"), Some("first"));
    assert_eq!(env.var("DUPLICATE").as_deref(), Some("first"));
    return Ok(());
}
