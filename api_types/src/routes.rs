macro_rules! create_routes {
    ($name:ident => $ret:literal $($tt:tt)*) => {
        create_routes! {
            $name() => $ret
            $($tt)*
        }
    };

    ($name:ident($($param_name:ident: $param_ty:ty),* $(,)?) => $ret:literal $($tt:tt)*) => {
        #[inline(always)]
        pub fn $name($($param_name: $param_ty),*) -> String {
            format!($ret)
        }

        create_routes! {
            $($tt)*
        }


    };

    () => {}
}

create_routes! {
    gateway => "/gateway"

    gateway_bot => "/gateway/bot"

    oauth2_authorize => "/oauth2/authorize"

    oauth2_token => "/oauth2/token"

    users_me => "/users/@me"

    users_me_guilds => "/users/@me/guilds"

    guild_channels(guild_id: &str) => "/guilds/{guild_id}/channels"

    channel_messages(channel_id: &str) => "/channels/{channel_id}/messages"
}
