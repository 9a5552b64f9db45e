#[macro_use]
extern crate log;

#[cfg(target_family = "unix")]
use argh::FromArgs;

#[cfg(target_family = "unix")]
use smb_scenario_client::{OperationResult, PavaoBackend, SmbClient};

#[cfg(target_family = "unix")]
#[derive(FromArgs)]
#[argh(description = "
Runs a scripted iteration against an SMB share: share listing, file writes and reads,
directory operations and a local file copy. Exits with an error if any check fails.

where positional is: address:port")]
struct Args {
    #[argh(option, short = 'P', description = "specify password")]
    password: Option<String>,
    #[argh(option, short = 'u', description = "specify username")]
    username: String,
    #[argh(
        option,
        short = 'w',
        default = r#""WORKGROUP".to_string()"#,
        description = "specify workgroup"
    )]
    workgroup: String,
    #[argh(option, short = 's', description = "specify share")]
    share: String,
    #[argh(
        option,
        short = 'c',
        description = "local file to copy to the share"
    )]
    copy: Option<String>,
    #[argh(
        option,
        short = 'i',
        default = "1",
        description = "number of iterations"
    )]
    iterations: usize,
    #[argh(positional, description = "server address, as host:port")]
    server: String,
}

#[cfg(target_family = "unix")]
fn main() -> anyhow::Result<()> {
    assert!(env_logger::builder().try_init().is_ok());
    let args: Args = argh::from_env();
    let password = match &args.password {
        Some(p) => p.clone(),
        None => read_secret_from_tty("Password: ")?,
    };

    info!(
        "connecting to {} with share {}, username {} and workgroup {}",
        args.server, args.share, args.username, args.workgroup
    );
    let backend = PavaoBackend::default().workgroup(&args.workgroup);
    let mut client = SmbClient::connect(
        &backend,
        &args.server,
        &args.username,
        &password,
        &args.share,
        Box::new(smb_scenario_client::LogSink),
    )
    .ok_or_else(|| anyhow::anyhow!("could not connect to {}", args.server))?;
    info!("client connected");

    let mut failures = 0;
    for iteration in 0..args.iterations {
        failures += run_iteration(&mut client, iteration, args.copy.as_deref());
    }

    info!("disconnecting client...");
    client.close();
    info!("client disconnected");

    match failures {
        0 => Ok(()),
        n => Err(anyhow::anyhow!("{} checks failed", n)),
    }
}

#[cfg(target_family = "unix")]
fn run_iteration(client: &mut SmbClient<PavaoBackend>, iteration: usize, copy: Option<&str>) -> usize {
    let file_name = format!("test_{}.txt", iteration);
    let dir_name = format!("test-dir_{}", iteration);
    let nested = format!("{}/{}", dir_name, file_name);
    let mut failures = 0;
    let mut check = |name: &str, ok: bool| {
        println!("{} {}", if ok { "✓" } else { "✗" }, name);
        if !ok {
            failures += 1;
        }
    };

    let shares = client.get_shares();
    check("shares retrieved", shares.success);
    check("file written", succeeded(client.append_string(&file_name, "Hello, World!")));
    check("is file", client.file_exists(&file_name));
    check("file read", client.read_file(&file_name) == "Hello, World!");
    check("file deleted", succeeded(client.delete_file(&file_name)));
    check("dir created", succeeded(client.create_dir(&dir_name)));
    check("nested file written", succeeded(client.append_string(&nested, "Hello, World!")));
    check(
        "dir listed",
        client
            .list_files_in_dir(&dir_name)
            .map(|files| !files.is_empty())
            .unwrap_or(false),
    );
    check("is dir", client.is_dir(&dir_name));
    check("dir exists", client.dir_exists(&dir_name));
    check("nested file deleted", succeeded(client.delete_file(&nested)));
    check("dir deleted", succeeded(client.delete_dir(&dir_name)));
    if let Some(source) = copy {
        check("file copied", succeeded(client.copy_file(source, "copy.txt")));
    }
    failures
}

#[cfg(target_family = "unix")]
fn succeeded(result: OperationResult) -> bool {
    if !result.success {
        error!("{}", result.message);
    }
    result.success
}

#[cfg(target_family = "unix")]
/// Read a secret from tty with customisable prompt
fn read_secret_from_tty(prompt: &str) -> std::io::Result<String> {
    rpassword::prompt_password(prompt)
}

#[cfg(not(target_family = "unix"))]
fn main() {
    error!("the libsmbclient backend is only available on unix");
}
