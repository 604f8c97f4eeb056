mod payhub;

pub use payhub::PayHubGateway;
