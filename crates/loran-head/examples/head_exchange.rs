//! Basic Head Exchange Example
//!
//! This example starts two hosts on loopback, publishes a root identifier
//! for a topic on one of them, and queries it from the other.

use std::sync::Arc;

use loran_core::{RootCid, CODEC_RAW};
use loran_head::{derive_protocol_id, query_root_cid, Publisher};
use loran_transport::Host;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== LORAN Head Exchange Example ===\n");

    // 1. Bind two hosts
    println!("1. Binding hosts...");
    let server = Host::bind("127.0.0.1:0".parse()?).await?;
    let client = Host::bind("127.0.0.1:0".parse()?).await?;
    println!("   Server: {} at {}", server.id(), server.local_addr());
    println!("   Client: {} at {}", client.id(), client.local_addr());

    // 2. Teach the client where the server lives
    println!("\n2. Populating the client's address book...");
    client.add_address(server.id(), server.local_addr());

    // 3. Start publishing the topic
    let topic = "example";
    println!("\n3. Serving topic {:?}...", topic);
    println!("   Protocol id: {}", derive_protocol_id(topic));
    let publisher = Arc::new(Publisher::new());
    let serve_host = server.clone();
    let serving = Arc::clone(&publisher);
    let serve_task = tokio::spawn(async move { serving.serve(&serve_host, topic).await });

    // Give the serve loop a moment to register its listener
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // 4. Query before any update
    println!("\n4. Querying before any root is published...");
    let before = query_root_cid(&client, topic, server.id()).await?;
    println!("   Unset sentinel returned: {}", before.is_unset());

    // 5. Publish a root and query again
    println!("\n5. Publishing a root for payload \"hello world\"...");
    let root = RootCid::from_data(CODEC_RAW, b"hello world");
    publisher.update_root(root);
    println!("   Root: {}", root);

    let after = query_root_cid(&client, topic, server.id()).await?;
    println!("   Queried: {}", after);
    println!("   Match: {}", after == root);

    // 6. Shut down
    println!("\n6. Closing publisher...");
    publisher.close().await?;
    serve_task.await??;
    server.close();
    client.close();
    println!("   Done");

    Ok(())
}
