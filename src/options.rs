use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct SendOptions {
    #[structopt(long = "to", help = "Recipient address")]
    pub recipient: String,

    #[structopt(long = "amount", help = "Amount in whole units of the native currency, i.e. 0.5")]
    pub amount: String,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// List recorded transactions
    #[structopt(name = "list")]
    List,
    /// Show a single recorded transaction
    #[structopt(name = "show")]
    Show {
        #[structopt(long = "hash")]
        hash: String,
    },
    /// Connect the wallet and print the active account
    #[structopt(name = "connect")]
    Connect,
    /// Send native currency and record the confirmed transaction
    #[structopt(name = "send")]
    Send(SendOptions),
    /// Run the HTTP front end
    #[structopt(name = "serve")]
    Serve {
        #[structopt(long = "listen", help = "Overrides server.listen from the config")]
        listen: Option<String>,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(name = "tx_viewer", about = "View and send recorded blockchain transactions")]
pub struct CliOptions {
    #[structopt(long = "config", default_value = "config-viewer.toml")]
    pub config: String,

    #[structopt(subcommand)]
    pub command: Command,
}
